use std::sync::Arc;
use crate::domain::ports::{
    AccommodationBookingRepository, AccommodationRepository, AuthRepository,
    TransportBookingRepository, TransportRepository, UserRepository,
};
use crate::domain::services::{
    admission::AdmissionController, auth_service::AuthService, availability::AvailabilityChecker,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub accommodation_repo: Arc<dyn AccommodationRepository>,
    pub transport_repo: Arc<dyn TransportRepository>,
    pub accommodation_booking_repo: Arc<dyn AccommodationBookingRepository>,
    pub transport_booking_repo: Arc<dyn TransportBookingRepository>,
    pub auth_service: Arc<AuthService>,
    pub admission: Arc<AdmissionController>,
    pub availability: Arc<AvailabilityChecker>,
}
