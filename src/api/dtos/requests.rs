use chrono::NaiveDate;
use serde::Deserialize;
use crate::domain::models::booking::{AccommodationBookingPatch, BookingStatus, TransportBookingPatch};
use crate::domain::services::admission::{AccommodationBookingRequest, TransportBookingRequest};
use crate::error::AppError;

/// Parses a `YYYY-MM-DD` date, naming the offending field on failure.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(field, "expected a date in YYYY-MM-DD format"))
}

pub fn required<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::validation(field, format!("{} is required", field)))
}

fn optional_date(field: &str, raw: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    raw.map(|r| parse_date(field, &r)).transpose()
}

fn optional_status(raw: Option<String>) -> Result<Option<BookingStatus>, AppError> {
    raw.map(|s| s.parse::<BookingStatus>()).transpose()
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateAccommodationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<f64>,
    pub capacity: Option<i32>,
    pub available: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateTransportRequest {
    pub vehicle_type: Option<String>,
    pub price_per_day: Option<f64>,
    pub total_capacity: Option<i32>,
    pub available: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateAccommodationBookingRequest {
    pub accommodation_id: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub total_price: Option<f64>,
}

impl CreateAccommodationBookingRequest {
    pub fn into_request(self) -> Result<AccommodationBookingRequest, AppError> {
        let accommodation_id = required("accommodation_id", self.accommodation_id)?;
        let check_in = required("check_in_date", self.check_in_date)?;
        let check_out = required("check_out_date", self.check_out_date)?;

        Ok(AccommodationBookingRequest {
            accommodation_id,
            check_in_date: parse_date("check_in_date", &check_in)?,
            check_out_date: parse_date("check_out_date", &check_out)?,
            total_price: self.total_price,
        })
    }
}

#[derive(Deserialize)]
pub struct CreateTransportBookingRequest {
    pub transport_id: Option<String>,
    pub travel_date: Option<String>,
    pub seats_booked: Option<i32>,
    pub total_price: Option<f64>,
}

impl CreateTransportBookingRequest {
    pub fn into_request(self) -> Result<TransportBookingRequest, AppError> {
        let transport_id = required("transport_id", self.transport_id)?;
        let travel_date = required("travel_date", self.travel_date)?;

        Ok(TransportBookingRequest {
            transport_id,
            travel_date: parse_date("travel_date", &travel_date)?,
            seats_booked: required("seats_booked", self.seats_booked)?,
            total_price: self.total_price,
        })
    }
}

/// Ownership fields (`tourist_id`, `accommodation_id`) are not accepted here;
/// unknown keys in the body are ignored.
#[derive(Deserialize)]
pub struct UpdateAccommodationBookingRequest {
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub total_price: Option<f64>,
    pub status: Option<String>,
}

impl UpdateAccommodationBookingRequest {
    pub fn into_patch(self) -> Result<AccommodationBookingPatch, AppError> {
        Ok(AccommodationBookingPatch {
            check_in_date: optional_date("check_in_date", self.check_in_date)?,
            check_out_date: optional_date("check_out_date", self.check_out_date)?,
            total_price: self.total_price,
            status: optional_status(self.status)?,
        })
    }
}

#[derive(Deserialize)]
pub struct UpdateTransportBookingRequest {
    pub travel_date: Option<String>,
    pub seats_booked: Option<i32>,
    pub total_price: Option<f64>,
    pub status: Option<String>,
}

impl UpdateTransportBookingRequest {
    pub fn into_patch(self) -> Result<TransportBookingPatch, AppError> {
        Ok(TransportBookingPatch {
            travel_date: optional_date("travel_date", self.travel_date)?,
            seats_booked: self.seats_booked,
            total_price: self.total_price,
            status: optional_status(self.status)?,
        })
    }
}

#[derive(Deserialize)]
pub struct AccommodationAvailabilityQuery {
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub exclude_booking_id: Option<String>,
}

#[derive(Deserialize)]
pub struct TransportAvailabilityQuery {
    pub travel_date: Option<String>,
    pub seats: Option<i32>,
    pub exclude_booking_id: Option<String>,
}
