use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use crate::domain::models::user::User;
use crate::domain::services::availability::SeatAvailability;

/// Public view of a user. Never carries the password hash.
#[derive(Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub csrf_token: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
pub struct AccommodationAvailabilityResponse {
    pub accommodation_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub available: bool,
}

#[derive(Serialize)]
pub struct TransportAvailabilityResponse {
    pub transport_id: String,
    pub travel_date: NaiveDate,
    pub seats_requested: i32,
    #[serde(flatten)]
    pub seats: SeatAvailability,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}
