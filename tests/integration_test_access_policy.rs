mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_other_tourist_cannot_touch_booking() {
    let app = TestApp::new().await;
    let driver = app.register("Driver", "driver@example.com", "driver").await;
    let owner = app.register("Owner", "owner@example.com", "tourist").await;
    let intruder = app.register("Intruder", "intruder@example.com", "tourist").await;
    let transport_id = app.create_transport(&driver, 6).await;

    let (_, booking) = app.send("POST", "/api/v1/transport-bookings", Some(&owner), Some(json!({
        "transport_id": transport_id,
        "travel_date": "2026-05-01",
        "seats_booked": 2
    }))).await;
    let uri = format!("/api/v1/transport-bookings/{}", booking["id"].as_str().unwrap());

    let (status, _) = app.send("GET", &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("PATCH", &uri, Some(&intruder), Some(json!({ "seats_booked": 1 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("POST", &format!("{}/cancel", uri), Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.send("GET", &uri, Some(&owner), None).await;
    assert_eq!(body["seats_booked"], 2);
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_own_update_into_conflict_leaves_original() {
    let app = TestApp::new().await;
    let host = app.register("Host", "host@example.com", "host").await;
    let tourist = app.register("Tourist", "tourist@example.com", "tourist").await;
    let other = app.register("Other", "other@example.com", "tourist").await;
    let id = app.create_accommodation(&host, 2).await;

    let (_, mine) = app.send("POST", "/api/v1/accommodation-bookings", Some(&tourist), Some(json!({
        "accommodation_id": id,
        "check_in_date": "2026-02-01",
        "check_out_date": "2026-02-03"
    }))).await;
    app.send("POST", "/api/v1/accommodation-bookings", Some(&other), Some(json!({
        "accommodation_id": id,
        "check_in_date": "2026-02-05",
        "check_out_date": "2026-02-08"
    }))).await;

    let uri = format!("/api/v1/accommodation-bookings/{}", mine["id"].as_str().unwrap());
    let (status, _) = app.send("PATCH", &uri, Some(&tourist), Some(json!({ "check_out_date": "2026-02-06" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.send("GET", &uri, Some(&tourist), None).await;
    assert_eq!(body["check_out_date"], "2026-02-03");
}

#[tokio::test]
async fn test_only_tourists_create_bookings() {
    let app = TestApp::new().await;
    let host = app.register("Host", "host@example.com", "host").await;
    let id = app.create_accommodation(&host, 2).await;

    let (status, _) = app.send("POST", "/api/v1/accommodation-bookings", Some(&host), Some(json!({
        "accommodation_id": id,
        "check_in_date": "2026-02-01",
        "check_out_date": "2026-02-03"
    }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_booking_lists_are_scoped_by_role() {
    let app = TestApp::new().await;
    let host = app.register("Host", "host@example.com", "host").await;
    let other_host = app.register("Other Host", "otherhost@example.com", "host").await;
    let driver = app.register("Driver", "driver@example.com", "driver").await;
    let tourist = app.register("Tourist", "tourist@example.com", "tourist").await;
    let other_tourist = app.register("Other", "other@example.com", "tourist").await;

    let mine = app.create_accommodation(&host, 2).await;
    let theirs = app.create_accommodation(&other_host, 2).await;

    for (who, accommodation) in [(&tourist, &mine), (&other_tourist, &theirs)] {
        let (status, _) = app.send("POST", "/api/v1/accommodation-bookings", Some(who), Some(json!({
            "accommodation_id": accommodation,
            "check_in_date": "2026-03-01",
            "check_out_date": "2026-03-04"
        }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.send("GET", "/api/v1/accommodation-bookings", Some(&tourist), None).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["tourist_id"], tourist.user_id.as_str());

    let (_, body) = app.send("GET", "/api/v1/accommodation-bookings", Some(&host), None).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["accommodation_id"], mine.as_str());

    let (_, body) = app.send("GET", "/api/v1/host/bookings", Some(&host), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.send("GET", "/api/v1/accommodation-bookings", Some(&driver), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("GET", "/api/v1/host/bookings", Some(&driver), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("GET", &format!("/api/v1/host/accommodations/{}/bookings", theirs), Some(&host), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send("GET", "/api/v1/driver/bookings", Some(&driver), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_driver_dashboard_per_transport() {
    let app = TestApp::new().await;
    let driver = app.register("Driver", "driver@example.com", "driver").await;
    let rival = app.register("Rival", "rival@example.com", "driver").await;
    let tourist = app.register("Tourist", "tourist@example.com", "tourist").await;
    let transport_id = app.create_transport(&driver, 6).await;

    app.send("POST", "/api/v1/transport-bookings", Some(&tourist), Some(json!({
        "transport_id": transport_id,
        "travel_date": "2026-05-01",
        "seats_booked": 2
    }))).await;

    let uri = format!("/api/v1/driver/transports/{}/bookings", transport_id);
    let (status, body) = app.send("GET", &uri, Some(&driver), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.send("GET", &uri, Some(&rival), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("GET", &uri, Some(&tourist), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
