use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use crate::domain::services::availability::{validate_price, validate_seats, validate_stay};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// `pending -> confirmed`, `pending -> cancelled`, `confirmed -> cancelled`.
    /// Staying in the current state is always allowed; nothing leaves `cancelled`.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        self == next
            || matches!(
                (self, next),
                (BookingStatus::Pending, BookingStatus::Confirmed)
                    | (BookingStatus::Pending, BookingStatus::Cancelled)
                    | (BookingStatus::Confirmed, BookingStatus::Cancelled)
            )
    }

    pub fn transition_to(self, next: BookingStatus) -> Result<BookingStatus, AppError> {
        if !self.can_transition_to(next) {
            return Err(AppError::validation(
                "status",
                format!("cannot change status from {} to {}", self, next),
            ));
        }
        Ok(next)
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(AppError::validation("status", "status must be one of: pending, confirmed, cancelled")),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn stored_status(raw: &str) -> Result<BookingStatus, AppError> {
    raw.parse()
        .map_err(|_| AppError::InternalWithMsg(format!("corrupt booking status '{}'", raw)))
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AccommodationBooking {
    pub id: String,
    pub tourist_id: String,
    pub accommodation_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewAccommodationBookingParams {
    pub tourist_id: String,
    pub accommodation_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: f64,
}

impl AccommodationBooking {
    pub fn new(params: NewAccommodationBookingParams) -> Result<Self, AppError> {
        validate_stay(params.check_in_date, params.check_out_date)?;
        validate_price(params.total_price)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            tourist_id: params.tourist_id,
            accommodation_id: params.accommodation_id,
            check_in_date: params.check_in_date,
            check_out_date: params.check_out_date,
            total_price: params.total_price,
            status: BookingStatus::Pending.as_str().to_string(),
            created_at: Utc::now(),
        })
    }

    pub fn status(&self) -> Result<BookingStatus, AppError> {
        stored_status(&self.status)
    }

    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled.as_str()
    }

    pub fn apply_patch(&mut self, patch: AccommodationBookingPatch) -> Result<(), AppError> {
        let current = self.status()?;
        let touches_terms = patch.check_in_date.is_some()
            || patch.check_out_date.is_some()
            || patch.total_price.is_some();

        if current == BookingStatus::Cancelled && touches_terms {
            return Err(AppError::validation("status", "booking is cancelled and can no longer be changed"));
        }

        let next = match patch.status {
            Some(next) => current.transition_to(next)?,
            None => current,
        };
        let check_in = patch.check_in_date.unwrap_or(self.check_in_date);
        let check_out = patch.check_out_date.unwrap_or(self.check_out_date);
        validate_stay(check_in, check_out)?;
        if let Some(price) = patch.total_price {
            validate_price(price)?;
            self.total_price = price;
        }

        self.check_in_date = check_in;
        self.check_out_date = check_out;
        self.status = next.as_str().to_string();
        Ok(())
    }
}

/// Fields that may change on an accommodation booking after admission.
#[derive(Debug, Default)]
pub struct AccommodationBookingPatch {
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub total_price: Option<f64>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TransportBooking {
    pub id: String,
    pub tourist_id: String,
    pub transport_id: String,
    pub travel_date: NaiveDate,
    pub seats_booked: i32,
    pub total_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewTransportBookingParams {
    pub tourist_id: String,
    pub transport_id: String,
    pub travel_date: NaiveDate,
    pub seats_booked: i32,
    pub total_price: f64,
}

impl TransportBooking {
    pub fn new(params: NewTransportBookingParams) -> Result<Self, AppError> {
        validate_seats(params.seats_booked)?;
        validate_price(params.total_price)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            tourist_id: params.tourist_id,
            transport_id: params.transport_id,
            travel_date: params.travel_date,
            seats_booked: params.seats_booked,
            total_price: params.total_price,
            status: BookingStatus::Pending.as_str().to_string(),
            created_at: Utc::now(),
        })
    }

    pub fn status(&self) -> Result<BookingStatus, AppError> {
        stored_status(&self.status)
    }

    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled.as_str()
    }

    pub fn apply_patch(&mut self, patch: TransportBookingPatch) -> Result<(), AppError> {
        let current = self.status()?;
        let touches_terms = patch.travel_date.is_some()
            || patch.seats_booked.is_some()
            || patch.total_price.is_some();

        if current == BookingStatus::Cancelled && touches_terms {
            return Err(AppError::validation("status", "booking is cancelled and can no longer be changed"));
        }

        let next = match patch.status {
            Some(next) => current.transition_to(next)?,
            None => current,
        };
        if let Some(seats) = patch.seats_booked {
            validate_seats(seats)?;
        }
        if let Some(price) = patch.total_price {
            validate_price(price)?;
        }

        if let Some(seats) = patch.seats_booked { self.seats_booked = seats; }
        if let Some(price) = patch.total_price { self.total_price = price; }
        if let Some(date) = patch.travel_date { self.travel_date = date; }
        self.status = next.as_str().to_string();
        Ok(())
    }
}

/// Fields that may change on a transport booking after admission.
#[derive(Debug, Default)]
pub struct TransportBookingPatch {
    pub travel_date: Option<NaiveDate>,
    pub seats_booked: Option<i32>,
    pub total_price: Option<f64>,
    pub status: Option<BookingStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn stay() -> AccommodationBooking {
        AccommodationBooking::new(NewAccommodationBookingParams {
            tourist_id: "tourist-1".into(),
            accommodation_id: "acc-1".into(),
            check_in_date: d("2026-01-15"),
            check_out_date: d("2026-01-18"),
            total_price: 450.0,
        }).unwrap()
    }

    #[test]
    fn test_status_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Cancelled.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn test_unknown_status_is_validation_error() {
        match "archived".parse::<BookingStatus>() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "status"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_booking_starts_pending() {
        let booking = stay();
        assert_eq!(booking.status().unwrap(), BookingStatus::Pending);
        assert!(booking.is_active());
    }

    #[test]
    fn test_rejected_patch_leaves_booking_untouched() {
        let mut booking = stay();
        let err = booking.apply_patch(AccommodationBookingPatch {
            check_out_date: Some(d("2026-01-14")),
            total_price: Some(10.0),
            ..Default::default()
        });
        assert!(err.is_err());
        assert_eq!(booking.check_out_date, d("2026-01-18"));
        assert_eq!(booking.total_price, 450.0);
    }

    #[test]
    fn test_cancelled_booking_terms_are_frozen() {
        let mut booking = stay();
        booking.apply_patch(AccommodationBookingPatch {
            status: Some(BookingStatus::Cancelled),
            ..Default::default()
        }).unwrap();
        assert!(!booking.is_active());

        let err = booking.apply_patch(AccommodationBookingPatch {
            check_in_date: Some(d("2026-01-16")),
            ..Default::default()
        });
        assert!(matches!(err, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_transport_patch_validates_seats() {
        let mut booking = TransportBooking::new(NewTransportBookingParams {
            tourist_id: "tourist-1".into(),
            transport_id: "tr-1".into(),
            travel_date: d("2026-06-15"),
            seats_booked: 2,
            total_price: 160.0,
        }).unwrap();

        assert!(booking.apply_patch(TransportBookingPatch { seats_booked: Some(0), ..Default::default() }).is_err());
        assert_eq!(booking.seats_booked, 2);

        booking.apply_patch(TransportBookingPatch { seats_booked: Some(3), ..Default::default() }).unwrap();
        assert_eq!(booking.seats_booked, 3);
    }
}
