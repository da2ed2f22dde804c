use std::sync::Arc;
use chrono::NaiveDate;
use crate::domain::models::listing::{Accommodation, Transport};
use crate::domain::ports::{
    AccommodationBookingRepository, AccommodationRepository,
    TransportBookingRepository, TransportRepository,
};
use crate::error::AppError;

/// Half-open interval test: `[a_start, a_end)` and `[b_start, b_end)` share at least one day.
pub fn ranges_overlap(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start < b_end && a_end > b_start
}

pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), AppError> {
    if check_out <= check_in {
        return Err(AppError::validation("check_out_date", "check_out_date must be after check_in_date"));
    }
    Ok(())
}

pub fn validate_seats(seats: i32) -> Result<(), AppError> {
    if seats < 1 {
        return Err(AppError::validation("seats_booked", "seats_booked must be at least 1"));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation("total_price", "total_price must be a non-negative number"));
    }
    Ok(())
}

pub fn seats_fit(already_booked: i64, requested: i32, total_capacity: i32) -> bool {
    already_booked + i64::from(requested) <= i64::from(total_capacity)
}

/// A transport's capacity may shrink only while the busiest date still fits.
pub fn capacity_covers(peak_seats_booked: i64, total_capacity: i32) -> bool {
    peak_seats_booked <= i64::from(total_capacity)
}

pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

pub fn quote_stay(accommodation: &Accommodation, check_in: NaiveDate, check_out: NaiveDate) -> f64 {
    accommodation.price_per_night * nights(check_in, check_out) as f64
}

pub fn quote_seats(transport: &Transport, seats: i32) -> f64 {
    transport.price_per_day * f64::from(seats)
}

pub fn ensure_accommodation_open(accommodation: &Accommodation) -> Result<(), AppError> {
    if !accommodation.available {
        return Err(AppError::Conflict("Accommodation is not accepting bookings".into()));
    }
    Ok(())
}

pub fn ensure_transport_open(transport: &Transport) -> Result<(), AppError> {
    if !transport.available {
        return Err(AppError::Conflict("Transport is not accepting bookings".into()));
    }
    Ok(())
}

/// Lock-free availability reads. The admission path runs the same queries
/// again inside its locked transaction, so an answer from here is advisory.
pub struct AvailabilityChecker {
    accommodation_repo: Arc<dyn AccommodationRepository>,
    transport_repo: Arc<dyn TransportRepository>,
    accommodation_booking_repo: Arc<dyn AccommodationBookingRepository>,
    transport_booking_repo: Arc<dyn TransportBookingRepository>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SeatAvailability {
    pub available: bool,
    pub seats_booked: i64,
    pub seats_remaining: i64,
}

impl AvailabilityChecker {
    pub fn new(
        accommodation_repo: Arc<dyn AccommodationRepository>,
        transport_repo: Arc<dyn TransportRepository>,
        accommodation_booking_repo: Arc<dyn AccommodationBookingRepository>,
        transport_booking_repo: Arc<dyn TransportBookingRepository>,
    ) -> Self {
        Self { accommodation_repo, transport_repo, accommodation_booking_repo, transport_booking_repo }
    }

    pub async fn check_accommodation_availability(
        &self,
        accommodation_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_booking_id: Option<&str>,
    ) -> Result<bool, AppError> {
        validate_stay(check_in, check_out)?;

        let accommodation = self.accommodation_repo.find_by_id(accommodation_id).await?
            .ok_or(AppError::NotFound("Accommodation not found".into()))?;
        if !accommodation.available {
            return Ok(false);
        }

        let overlapping = self.accommodation_booking_repo
            .count_overlapping(accommodation_id, check_in, check_out, exclude_booking_id)
            .await?;
        Ok(overlapping == 0)
    }

    pub async fn check_transport_availability(
        &self,
        transport_id: &str,
        travel_date: NaiveDate,
        seats_requested: i32,
        exclude_booking_id: Option<&str>,
    ) -> Result<SeatAvailability, AppError> {
        validate_seats(seats_requested)?;

        let transport = self.transport_repo.find_by_id(transport_id).await?
            .ok_or(AppError::NotFound("Transport not found".into()))?;

        let booked = self.transport_booking_repo
            .seats_booked_on(transport_id, travel_date, exclude_booking_id)
            .await?;

        Ok(SeatAvailability {
            available: transport.available && seats_fit(booked, seats_requested, transport.total_capacity),
            seats_booked: booked,
            seats_remaining: (i64::from(transport.total_capacity) - booked).max(0),
        })
    }
}
