use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{parse_date, required, AccommodationAvailabilityQuery, CreateAccommodationRequest};
use crate::api::dtos::responses::AccommodationAvailabilityResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::listing::{
    Accommodation, AccommodationPatch, ListingFilter, ListingKind, NewAccommodationParams,
};
use crate::domain::services::access_policy::{authorize_listing_create, authorize_listing_mutation};
use std::sync::Arc;
use tracing::info;

pub async fn create_accommodation(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateAccommodationRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize_listing_create(&caller, ListingKind::Accommodation)?;

    let accommodation = Accommodation::new(NewAccommodationParams {
        host_id: caller.user_id.clone(),
        title: payload.title.unwrap_or_default(),
        description: payload.description.unwrap_or_default(),
        location: payload.location.unwrap_or_default(),
        price_per_night: required("price_per_night", payload.price_per_night)?,
        capacity: required("capacity", payload.capacity)?,
        available: payload.available,
    })?;

    let created = state.accommodation_repo.create(&accommodation).await?;
    info!("Accommodation created: {} by host {}", created.id, created.host_id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_accommodations(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ListingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let accommodations = state.accommodation_repo.list(&filter).await?;
    Ok(Json(accommodations))
}

pub async fn get_accommodation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let accommodation = find_accommodation(&state, &id).await?;
    Ok(Json(accommodation))
}

pub async fn update_accommodation(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<AccommodationPatch>,
) -> Result<impl IntoResponse, AppError> {
    let mut accommodation = find_accommodation(&state, &id).await?;
    authorize_listing_mutation(&caller, ListingKind::Accommodation, &accommodation.host_id)?;

    accommodation.apply_patch(patch)?;
    let updated = state.accommodation_repo.update(&accommodation).await?;

    info!("Accommodation updated: {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_accommodation(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let accommodation = find_accommodation(&state, &id).await?;
    authorize_listing_mutation(&caller, ListingKind::Accommodation, &accommodation.host_id)?;

    state.accommodation_repo.delete(&accommodation.id).await?;
    info!("Accommodation deleted: {}", accommodation.id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<AccommodationAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let check_in = parse_date("check_in_date", &required("check_in_date", query.check_in_date)?)?;
    let check_out = parse_date("check_out_date", &required("check_out_date", query.check_out_date)?)?;

    let available = state.availability
        .check_accommodation_availability(&id, check_in, check_out, query.exclude_booking_id.as_deref())
        .await?;

    Ok(Json(AccommodationAvailabilityResponse {
        accommodation_id: id,
        check_in_date: check_in,
        check_out_date: check_out,
        available,
    }))
}

async fn find_accommodation(state: &AppState, id: &str) -> Result<Accommodation, AppError> {
    state.accommodation_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Accommodation not found".into()))
}
