use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Accommodation,
    Transport,
}

impl ListingKind {
    pub fn label(&self) -> &'static str {
        match self {
            ListingKind::Accommodation => "accommodation",
            ListingKind::Transport => "transport",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Accommodation {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price_per_night: f64,
    pub capacity: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewAccommodationParams {
    pub host_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price_per_night: f64,
    pub capacity: i32,
    pub available: Option<bool>,
}

impl Accommodation {
    pub fn new(params: NewAccommodationParams) -> Result<Self, AppError> {
        require_text("title", &params.title)?;
        require_text("description", &params.description)?;
        require_text("location", &params.location)?;
        require_price("price_per_night", params.price_per_night)?;
        require_positive("capacity", params.capacity)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            host_id: params.host_id,
            title: params.title,
            description: params.description,
            location: params.location,
            price_per_night: params.price_per_night,
            capacity: params.capacity,
            available: params.available.unwrap_or(true),
            created_at: Utc::now(),
        })
    }

    pub fn apply_patch(&mut self, patch: AccommodationPatch) -> Result<(), AppError> {
        if let Some(val) = patch.title {
            require_text("title", &val)?;
            self.title = val;
        }
        if let Some(val) = patch.description {
            require_text("description", &val)?;
            self.description = val;
        }
        if let Some(val) = patch.location {
            require_text("location", &val)?;
            self.location = val;
        }
        if let Some(val) = patch.price_per_night {
            require_price("price_per_night", val)?;
            self.price_per_night = val;
        }
        if let Some(val) = patch.capacity {
            require_positive("capacity", val)?;
            self.capacity = val;
        }
        if let Some(val) = patch.available { self.available = val; }
        Ok(())
    }
}

/// Fields a host may change on an accommodation. Ownership and identity are not patchable.
#[derive(Debug, Deserialize, Default)]
pub struct AccommodationPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<f64>,
    pub capacity: Option<i32>,
    pub available: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Transport {
    pub id: String,
    pub driver_id: String,
    pub vehicle_type: String,
    pub price_per_day: f64,
    pub total_capacity: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewTransportParams {
    pub driver_id: String,
    pub vehicle_type: String,
    pub price_per_day: f64,
    pub total_capacity: i32,
    pub available: Option<bool>,
}

impl Transport {
    pub fn new(params: NewTransportParams) -> Result<Self, AppError> {
        require_text("vehicle_type", &params.vehicle_type)?;
        require_price("price_per_day", params.price_per_day)?;
        require_positive("total_capacity", params.total_capacity)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            driver_id: params.driver_id,
            vehicle_type: params.vehicle_type,
            price_per_day: params.price_per_day,
            total_capacity: params.total_capacity,
            available: params.available.unwrap_or(true),
            created_at: Utc::now(),
        })
    }

    pub fn apply_patch(&mut self, patch: TransportPatch) -> Result<(), AppError> {
        if let Some(val) = patch.vehicle_type {
            require_text("vehicle_type", &val)?;
            self.vehicle_type = val;
        }
        if let Some(val) = patch.price_per_day {
            require_price("price_per_day", val)?;
            self.price_per_day = val;
        }
        if let Some(val) = patch.total_capacity {
            require_positive("total_capacity", val)?;
            self.total_capacity = val;
        }
        if let Some(val) = patch.available { self.available = val; }
        Ok(())
    }
}

/// Fields a driver may change on a transport.
#[derive(Debug, Deserialize, Default)]
pub struct TransportPatch {
    pub vehicle_type: Option<String>,
    pub price_per_day: Option<f64>,
    pub total_capacity: Option<i32>,
    pub available: Option<bool>,
}

/// Optional filters for the public listing browse.
#[derive(Debug, Deserialize, Default)]
pub struct ListingFilter {
    pub location: Option<String>,
    pub available: Option<bool>,
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, format!("{} is required", field)));
    }
    Ok(())
}

fn require_price(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(field, format!("{} must be a non-negative number", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: i32) -> Result<(), AppError> {
    if value < 1 {
        return Err(AppError::validation(field, format!("{} must be at least 1", field)));
    }
    Ok(())
}
