mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{parse_body, TestApp};
use serde_json::json;
use tower::ServiceExt;

fn cookie_value(set_cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies.iter()
        .find(|c| c.starts_with(&prefix))
        .map(|c| {
            let rest = &c[prefix.len()..];
            rest.split(';').next().unwrap_or("").to_string()
        })
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new().await;
    let tourist = app.register("Amani", "amani@example.com", "tourist").await;

    let (status, body) = app.send("GET", "/api/v1/auth/me", Some(&tourist), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "amani@example.com");
    assert_eq!(body["role"], "tourist");
    assert!(body.get("password_hash").is_none(), "profile must not expose the hash");

    let (status, body) = app.send("POST", "/api/v1/auth/login", None, Some(json!({
        "email": "AMANI@example.com",
        "password": "safari-pass-123"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], tourist.user_id.as_str());
    assert!(body["access_token"].as_str().is_some());

    let (status, _) = app.send("POST", "/api/v1/auth/login", None, Some(json!({
        "email": "amani@example.com",
        "password": "wrong-password"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let app = TestApp::new().await;
    app.register("Baraka", "baraka@example.com", "host").await;

    let (status, body) = app.send("POST", "/api/v1/auth/register", None, Some(json!({
        "name": "Second Baraka",
        "email": "baraka@example.com",
        "password": "another-pass-1"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT, "duplicate email: {}", body);

    let (status, body) = app.send("POST", "/api/v1/auth/register", None, Some(json!({
        "email": "noname@example.com",
        "password": "another-pass-1"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "name");

    let (status, body) = app.send("POST", "/api/v1/auth/register", None, Some(json!({
        "name": "Pilot",
        "email": "pilot@example.com",
        "password": "another-pass-1",
        "role": "pilot"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "role");
}

#[tokio::test]
async fn test_role_defaults_to_tourist() {
    let app = TestApp::new().await;
    let (status, body) = app.send("POST", "/api/v1/auth/register", None, Some(json!({
        "name": "Zawadi",
        "email": "zawadi@example.com",
        "password": "safari-pass-123",
        "phone_number": "+255700000001"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "tourist");
    assert_eq!(body["user"]["phone_number"], "+255700000001");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, _) = app.send("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/auth/me")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_session_requires_csrf_but_bearer_does_not() {
    let app = TestApp::new().await;
    let host = app.register("Neema", "neema@example.com", "host").await;
    let listing = json!({
        "title": "Kilimanjaro Lodge",
        "description": "Mountain views",
        "location": "Moshi",
        "price_per_night": 90.0,
        "capacity": 4
    });

    let response = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/accommodations")
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(listing.to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "cookie POST without CSRF must be rejected");

    let response = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/accommodations")
            .header(header::AUTHORIZATION, format!("Bearer {}", host.access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(listing.to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_refresh_rotates_and_consumes_token() {
    let app = TestApp::new().await;

    let response = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "name": "Juma",
                "email": "juma@example.com",
                "password": "safari-pass-123",
                "role": "driver"
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookies: Vec<String> = response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();
    let refresh_token = cookie_value(&set_cookies, "refresh_token").expect("No refresh_token cookie");

    let refresh = |token: String| {
        let router = app.router.clone();
        async move {
            router.oneshot(
                Request::builder().method("POST").uri("/api/v1/auth/refresh")
                    .header(header::COOKIE, format!("refresh_token={}", token))
                    .body(Body::empty()).unwrap()
            ).await.unwrap()
        }
    };

    let first = refresh(refresh_token.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = parse_body(first).await;
    assert_eq!(body["user"]["role"], "driver");

    let replay = refresh(refresh_token).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED, "a rotated token cannot be used twice");
}

#[tokio::test]
async fn test_delete_account_cascades_listings() {
    let app = TestApp::new().await;
    let host = app.register("Imani", "imani@example.com", "host").await;
    let accommodation_id = app.create_accommodation(&host, 2).await;

    let (status, _) = app.send("DELETE", "/api/v1/auth/me", Some(&host), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("GET", &format!("/api/v1/accommodations/{}", accommodation_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_revoke_all_ends_every_session() {
    let app = TestApp::new().await;
    let tourist = app.register("Neema", "neema@example.com", "tourist").await;

    let (status, _) = app.send("POST", "/api/v1/auth/login", None, Some(json!({
        "email": "neema@example.com",
        "password": "safari-pass-123"
    }))).await;
    assert_eq!(status, StatusCode::OK);

    let revoked = app.state.auth_service.revoke_all(&tourist.user_id).await.unwrap();
    assert_eq!(revoked, 2, "one session from register, one from login");
    assert_eq!(app.state.auth_service.revoke_all(&tourist.user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleted_account_cannot_refresh() {
    let app = TestApp::new().await;

    let response = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "name": "Baraka",
                "email": "baraka@example.com",
                "password": "safari-pass-123"
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookies: Vec<String> = response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();
    let refresh_token = cookie_value(&set_cookies, "refresh_token").expect("No refresh_token cookie");
    let body = parse_body(response).await;
    let access_token = body["access_token"].as_str().unwrap().to_string();

    let deleted = app.router.clone().oneshot(
        Request::builder().method("DELETE").uri("/api/v1/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let refreshed = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/refresh")
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(refreshed.status(), StatusCode::UNAUTHORIZED);
}
