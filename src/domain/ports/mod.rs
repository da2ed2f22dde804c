use crate::domain::models::{
    user::User,
    auth::RefreshTokenRecord,
    listing::{Accommodation, Transport, TransportPatch, ListingFilter},
    booking::{AccommodationBooking, AccommodationBookingPatch, TransportBooking, TransportBookingPatch},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Refresh-token sessions, stored by hash. A token is single-use:
/// `take_refresh_token` removes the row it returns. The delete methods
/// report how many sessions they ended.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn save_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn take_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_family(&self, family_id: Uuid) -> Result<u64, AppError>;
    async fn delete_for_user(&self, user_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait AccommodationRepository: Send + Sync {
    async fn create(&self, accommodation: &Accommodation) -> Result<Accommodation, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Accommodation>, AppError>;
    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Accommodation>, AppError>;
    async fn list_by_host(&self, host_id: &str) -> Result<Vec<Accommodation>, AppError>;
    async fn update(&self, accommodation: &Accommodation) -> Result<Accommodation, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait TransportRepository: Send + Sync {
    async fn create(&self, transport: &Transport) -> Result<Transport, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Transport>, AppError>;
    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Transport>, AppError>;
    async fn list_by_driver(&self, driver_id: &str) -> Result<Vec<Transport>, AppError>;
    /// Applies the patch under the transport lock. Rejects with `Conflict`
    /// when the new capacity is below the seats booked on any date.
    async fn update_if_capacity_holds(&self, id: &str, patch: TransportPatch) -> Result<Transport, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Storage for accommodation bookings.
///
/// `create_if_available` and `update_if_available` lock the referenced
/// accommodation for the duration of their transaction, run the overlap
/// check against the locked state and only then write. A rejected write
/// leaves the ledger untouched.
///
/// `update_if_available` applies the patch to the booking as re-read inside
/// that transaction, never to a copy the caller loaded earlier.
#[async_trait]
pub trait AccommodationBookingRepository: Send + Sync {
    async fn create_if_available(&self, booking: &AccommodationBooking) -> Result<AccommodationBooking, AppError>;
    async fn update_if_available(
        &self,
        id: &str,
        patch: AccommodationBookingPatch,
    ) -> Result<AccommodationBooking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<AccommodationBooking>, AppError>;
    async fn list_by_tourist(&self, tourist_id: &str) -> Result<Vec<AccommodationBooking>, AppError>;
    async fn list_by_host(&self, host_id: &str) -> Result<Vec<AccommodationBooking>, AppError>;
    async fn list_by_accommodation(&self, accommodation_id: &str) -> Result<Vec<AccommodationBooking>, AppError>;
    async fn cancel(&self, id: &str) -> Result<AccommodationBooking, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count_overlapping(
        &self,
        accommodation_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_booking_id: Option<&str>,
    ) -> Result<i64, AppError>;
}

/// Storage for transport bookings. Same locking contract as
/// [`AccommodationBookingRepository`], using the per-date seat sum.
#[async_trait]
pub trait TransportBookingRepository: Send + Sync {
    async fn create_if_available(&self, booking: &TransportBooking) -> Result<TransportBooking, AppError>;
    async fn update_if_available(&self, id: &str, patch: TransportBookingPatch) -> Result<TransportBooking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<TransportBooking>, AppError>;
    async fn list_by_tourist(&self, tourist_id: &str) -> Result<Vec<TransportBooking>, AppError>;
    async fn list_by_driver(&self, driver_id: &str) -> Result<Vec<TransportBooking>, AppError>;
    async fn list_by_transport(&self, transport_id: &str) -> Result<Vec<TransportBooking>, AppError>;
    async fn cancel(&self, id: &str) -> Result<TransportBooking, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn seats_booked_on(
        &self,
        transport_id: &str,
        travel_date: NaiveDate,
        exclude_booking_id: Option<&str>,
    ) -> Result<i64, AppError>;
}
