pub mod sqlite_user_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_accommodation_repo;
pub mod sqlite_transport_repo;
pub mod sqlite_accommodation_booking_repo;
pub mod sqlite_transport_booking_repo;

pub mod postgres_user_repo;
pub mod postgres_auth_repo;
pub mod postgres_accommodation_repo;
pub mod postgres_transport_repo;
pub mod postgres_accommodation_booking_repo;
pub mod postgres_transport_booking_repo;
