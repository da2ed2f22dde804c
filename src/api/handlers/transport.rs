use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{parse_date, required, CreateTransportRequest, TransportAvailabilityQuery};
use crate::api::dtos::responses::TransportAvailabilityResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::listing::{
    ListingFilter, ListingKind, NewTransportParams, Transport, TransportPatch,
};
use crate::domain::services::access_policy::{authorize_listing_create, authorize_listing_mutation};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn create_transport(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateTransportRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize_listing_create(&caller, ListingKind::Transport)?;

    let transport = Transport::new(NewTransportParams {
        driver_id: caller.user_id.clone(),
        vehicle_type: payload.vehicle_type.unwrap_or_default(),
        price_per_day: required("price_per_day", payload.price_per_day)?,
        total_capacity: required("total_capacity", payload.total_capacity)?,
        available: payload.available,
    })?;

    let created = state.transport_repo.create(&transport).await?;
    info!("Transport created: {} by driver {}", created.id, created.driver_id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_transports(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ListingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let transports = state.transport_repo.list(&filter).await?;
    Ok(Json(transports))
}

pub async fn get_transport(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let transport = find_transport(&state, &id).await?;
    Ok(Json(transport))
}

pub async fn update_transport(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<TransportPatch>,
) -> Result<impl IntoResponse, AppError> {
    let transport = find_transport(&state, &id).await?;
    authorize_listing_mutation(&caller, ListingKind::Transport, &transport.driver_id)?;

    let updated = state.transport_repo.update_if_capacity_holds(&transport.id, patch).await
        .inspect_err(|e| {
            if matches!(e, AppError::Conflict(_)) {
                warn!("Transport update rejected for {}: {}", transport.id, e);
            }
        })?;

    info!("Transport updated: {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_transport(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let transport = find_transport(&state, &id).await?;
    authorize_listing_mutation(&caller, ListingKind::Transport, &transport.driver_id)?;

    state.transport_repo.delete(&transport.id).await?;
    info!("Transport deleted: {}", transport.id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<TransportAvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let travel_date = parse_date("travel_date", &required("travel_date", query.travel_date)?)?;
    let seats_requested = query.seats.unwrap_or(1);

    let seats = state.availability
        .check_transport_availability(&id, travel_date, seats_requested, query.exclude_booking_id.as_deref())
        .await?;

    Ok(Json(TransportAvailabilityResponse {
        transport_id: id,
        travel_date,
        seats_requested,
        seats,
    }))
}

async fn find_transport(state: &AppState, id: &str) -> Result<Transport, AppError> {
    state.transport_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Transport not found".into()))
}
