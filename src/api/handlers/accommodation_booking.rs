use axum::{extract::{Path, State}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{CreateAccommodationBookingRequest, UpdateAccommodationBookingRequest};
use crate::api::extractors::auth::AuthUser;
use std::sync::Arc;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateAccommodationBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = payload.into_request()?;
    let booking = state.admission.create_accommodation_booking(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.admission.list_accommodation_bookings(&caller).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.admission.get_accommodation_booking(&caller, &id).await?;
    Ok(Json(booking))
}

pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAccommodationBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patch = payload.into_patch()?;
    let booking = state.admission.update_accommodation_booking(&caller, &id, patch).await?;
    Ok(Json(booking))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.admission.cancel_accommodation_booking(&caller, &id).await?;
    Ok(Json(booking))
}

pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.admission.delete_accommodation_booking(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
