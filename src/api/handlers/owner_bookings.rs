//! Host and driver dashboards over bookings on their own listings.

use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::AuthUser;
use std::sync::Arc;

pub async fn host_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.admission.list_host_bookings(&caller).await?;
    Ok(Json(bookings))
}

pub async fn host_accommodation_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(accommodation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.admission.list_bookings_for_accommodation(&caller, &accommodation_id).await?;
    Ok(Json(bookings))
}

pub async fn driver_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.admission.list_driver_bookings(&caller).await?;
    Ok(Json(bookings))
}

pub async fn driver_transport_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(transport_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.admission.list_bookings_for_transport(&caller, &transport_id).await?;
    Ok(Json(bookings))
}
