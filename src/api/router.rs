use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{
    accommodation, accommodation_booking, auth, health, owner_bookings, transport, transport_booking,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info, warn};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me).delete(auth::delete_me))

        // Listings
        .route("/api/v1/accommodations", get(accommodation::list_accommodations).post(accommodation::create_accommodation))
        .route("/api/v1/accommodations/{id}", get(accommodation::get_accommodation).patch(accommodation::update_accommodation).delete(accommodation::delete_accommodation))
        .route("/api/v1/accommodations/{id}/availability", get(accommodation::get_availability))
        .route("/api/v1/transports", get(transport::list_transports).post(transport::create_transport))
        .route("/api/v1/transports/{id}", get(transport::get_transport).patch(transport::update_transport).delete(transport::delete_transport))
        .route("/api/v1/transports/{id}/availability", get(transport::get_availability))

        // Bookings
        .route("/api/v1/accommodation-bookings", get(accommodation_booking::list_bookings).post(accommodation_booking::create_booking))
        .route("/api/v1/accommodation-bookings/{id}", get(accommodation_booking::get_booking).patch(accommodation_booking::update_booking).delete(accommodation_booking::delete_booking))
        .route("/api/v1/accommodation-bookings/{id}/cancel", post(accommodation_booking::cancel_booking))
        .route("/api/v1/transport-bookings", get(transport_booking::list_bookings).post(transport_booking::create_booking))
        .route("/api/v1/transport-bookings/{id}", get(transport_booking::get_booking).patch(transport_booking::update_booking).delete(transport_booking::delete_booking))
        .route("/api/v1/transport-bookings/{id}/cancel", post(transport_booking::cancel_booking))

        // Owner dashboards
        .route("/api/v1/host/bookings", get(owner_bookings::host_bookings))
        .route("/api/v1/host/accommodations/{id}/bookings", get(owner_bookings::host_accommodation_bookings))
        .route("/api/v1/driver/bookings", get(owner_bookings::driver_bookings))
        .route("/api/v1/driver/transports/{id}/bookings", get(owner_bookings::driver_transport_bookings))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins.iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>()
                .inspect_err(|_| warn!("Ignoring invalid CORS origin: {}", origin))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::HeaderName::from_static("x-csrf-token")])
        .allow_credentials(true)
}
