pub mod accommodation;
pub mod accommodation_booking;
pub mod auth;
pub mod health;
pub mod owner_bookings;
pub mod transport;
pub mod transport_booking;
