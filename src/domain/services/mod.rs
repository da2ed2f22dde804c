pub mod access_policy;
pub mod admission;
pub mod auth_service;
pub mod availability;
