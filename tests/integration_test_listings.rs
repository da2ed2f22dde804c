mod common;

use axum::http::StatusCode;
use common::{AuthHeaders, TestApp};
use serde_json::{json, Value};

async fn book_seats(
    app: &TestApp,
    tourist: &AuthHeaders,
    transport_id: &str,
    travel_date: &str,
    seats: i32,
) -> (StatusCode, Value) {
    app.send("POST", "/api/v1/transport-bookings", Some(tourist), Some(json!({
        "transport_id": transport_id,
        "travel_date": travel_date,
        "seats_booked": seats
    }))).await
}

#[tokio::test]
async fn test_only_hosts_create_accommodations() {
    let app = TestApp::new().await;
    let tourist = app.register("Tumaini", "tumaini@example.com", "tourist").await;
    let driver = app.register("Salim", "salim@example.com", "driver").await;

    for caller in [&tourist, &driver] {
        let (status, _) = app.send("POST", "/api/v1/accommodations", Some(caller), Some(json!({
            "title": "Not mine",
            "description": "x",
            "location": "Arusha",
            "price_per_night": 10.0,
            "capacity": 1
        }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _) = app.send("POST", "/api/v1/transports", Some(&tourist), Some(json!({
        "vehicle_type": "Van",
        "price_per_day": 40.0,
        "total_capacity": 8
    }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_accommodation_validation_names_field() {
    let app = TestApp::new().await;
    let host = app.register("Rehema", "rehema@example.com", "host").await;

    let (status, body) = app.send("POST", "/api/v1/accommodations", Some(&host), Some(json!({
        "title": "Lake House",
        "description": "Quiet",
        "location": "Naivasha",
        "price_per_night": 70.0,
        "capacity": 0
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "capacity");

    let (status, body) = app.send("POST", "/api/v1/accommodations", Some(&host), Some(json!({
        "description": "Quiet",
        "location": "Naivasha",
        "price_per_night": 70.0,
        "capacity": 2
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "title");
}

#[tokio::test]
async fn test_browse_filters_by_location_and_availability() {
    let app = TestApp::new().await;
    let host = app.register("Faraji", "faraji@example.com", "host").await;

    for (title, location, available) in [
        ("Mara Camp", "Maasai Mara", true),
        ("Mara Hideaway", "Maasai Mara", false),
        ("Beach Villa", "Zanzibar", true),
    ] {
        let (status, _) = app.send("POST", "/api/v1/accommodations", Some(&host), Some(json!({
            "title": title,
            "description": "Lovely",
            "location": location,
            "price_per_night": 100.0,
            "capacity": 2,
            "available": available
        }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.send("GET", "/api/v1/accommodations", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = app.send("GET", "/api/v1/accommodations?location=Mara", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app.send("GET", "/api/v1/accommodations?location=Mara&available=true", None, None).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Mara Camp");
}

#[tokio::test]
async fn test_only_owner_updates_or_deletes_listing() {
    let app = TestApp::new().await;
    let owner = app.register("Owner", "owner@example.com", "host").await;
    let rival = app.register("Rival", "rival@example.com", "host").await;
    let id = app.create_accommodation(&owner, 3).await;
    let uri = format!("/api/v1/accommodations/{}", id);

    let (status, _) = app.send("PATCH", &uri, Some(&rival), Some(json!({ "price_per_night": 1.0 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send("PATCH", &uri, Some(&owner), Some(json!({
        "price_per_night": 175.0,
        "host_id": rival.user_id
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price_per_night"], 175.0);
    assert_eq!(body["host_id"], owner.user_id.as_str(), "ownership is not patchable");

    let (status, _) = app.send("DELETE", &uri, Some(&rival), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_driver_manages_transport() {
    let app = TestApp::new().await;
    let driver = app.register("Dereva", "dereva@example.com", "driver").await;
    let id = app.create_transport(&driver, 6).await;
    let uri = format!("/api/v1/transports/{}", id);

    let (status, body) = app.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_capacity"], 6);
    assert_eq!(body["available"], true);

    let (status, body) = app.send("PATCH", &uri, Some(&driver), Some(json!({ "available": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (_, body) = app.send("GET", "/api/v1/transports?available=true", None, None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_closed_transport_reports_no_availability() {
    let app = TestApp::new().await;
    let driver = app.register("Dereva", "dereva@example.com", "driver").await;
    let id = app.create_transport(&driver, 6).await;

    app.send("PATCH", &format!("/api/v1/transports/{}", id), Some(&driver), Some(json!({ "available": false }))).await;

    let (status, body) = app.send(
        "GET",
        &format!("/api/v1/transports/{}/availability?travel_date=2026-06-15&seats=1", id),
        None,
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["seats_remaining"], 6);
}

#[tokio::test]
async fn test_capacity_cannot_drop_below_booked_seats() {
    let app = TestApp::new().await;
    let driver = app.register("Dereva", "dereva@example.com", "driver").await;
    let tourist = app.register("Msafiri", "msafiri@example.com", "tourist").await;
    let id = app.create_transport(&driver, 6).await;
    let uri = format!("/api/v1/transports/{}", id);

    let (status, _) = book_seats(&app, &tourist, &id, "2026-06-15", 4).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, cancelled) = book_seats(&app, &tourist, &id, "2026-06-16", 5).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.send("PATCH", &uri, Some(&driver), Some(json!({ "total_capacity": 2 }))).await;
    assert_eq!(status, StatusCode::CONFLICT, "the busiest date holds 5 seats");

    let cancel_uri = format!("/api/v1/transport-bookings/{}/cancel", cancelled["id"].as_str().unwrap());
    let (status, _) = app.send("POST", &cancel_uri, Some(&tourist), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send("PATCH", &uri, Some(&driver), Some(json!({ "total_capacity": 3 }))).await;
    assert_eq!(status, StatusCode::CONFLICT, "4 seats remain booked on 2026-06-15");

    let (_, body) = app.send("GET", &uri, None, None).await;
    assert_eq!(body["total_capacity"], 6, "a rejected patch changes nothing");

    let (status, body) = app.send("PATCH", &uri, Some(&driver), Some(json!({ "total_capacity": 4 }))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total_capacity"], 4);
}
