use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{LoginRequest, RegisterRequest};
use crate::api::dtos::responses::{AuthResponse, UserProfile};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::TokenPair;
use crate::domain::models::user::{NewUserParams, Role, User};
use crate::domain::services::auth_service::{ACCESS_TOKEN_MINUTES, REFRESH_TOKEN_DAYS};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use argon2::{password_hash::{SaltString, PasswordHasher}, PasswordHash, Argon2, PasswordVerifier};
use rand::rngs::OsRng;
use tracing::info;

fn required_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::validation(field, format!("{} is required", field))),
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = required_text("name", payload.name)?;
    let email = required_text("email", payload.email)?.to_lowercase();
    let password = required_text("password", payload.password)?;

    if !email.contains('@') {
        return Err(AppError::validation("email", "must be a valid e-mail address"));
    }
    if password.len() < 8 {
        return Err(AppError::validation("password", "must be at least 8 characters"));
    }

    let role = match payload.role {
        Some(raw) => raw.parse::<Role>().map_err(|e| AppError::validation("role", e))?,
        None => Role::Tourist,
    };

    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::Internal)?
        .to_string();

    let user = User::new(NewUserParams {
        name,
        email,
        phone_number: payload.phone_number.filter(|p| !p.trim().is_empty()),
        password_hash,
        role,
    });
    let created = state.user_repo.create(&user).await?;

    let tokens = state.auth_service.login(&created).await?;
    set_cookies(&cookies, &tokens);

    info!("Registered user {} as {}", created.id, created.role);

    Ok((StatusCode::CREATED, Json(auth_response(tokens, created))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_email(&payload.email.trim().to_lowercase()).await?
        .ok_or(AppError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal)?;

    Argon2::default().verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)?;

    let tokens = state.auth_service.login(&user).await?;
    set_cookies(&cookies, &tokens);

    info!("User logged in: {}", user.id);

    Ok(Json(auth_response(tokens, user)))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let refresh_cookie = cookies.get("refresh_token").ok_or(AppError::Unauthorized)?;
    let record = state.auth_service.redeem_refresh_token(refresh_cookie.value()).await?;

    let user = state.user_repo.find_by_id(&record.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let tokens = state.auth_service.rotate(&record, &user).await?;
    set_cookies(&cookies, &tokens);

    info!("Token refreshed for user: {}", user.id);

    Ok(Json(auth_response(tokens, user)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get("refresh_token") {
        let _ = state.auth_service.logout(cookie.value()).await;
    }

    cookies.remove(Cookie::build(("access_token", "")).path("/").into());
    cookies.remove(Cookie::build(("refresh_token", "")).path("/").into());

    info!("User logged out");

    Ok(StatusCode::OK)
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&caller.user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(UserProfile::from(user)))
}

/// Ends the caller's sessions, then deletes the account. Listings and
/// bookings go with it through the foreign key cascades.
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let revoked = state.auth_service.revoke_all(&caller.user_id).await?;
    state.user_repo.delete(&caller.user_id).await?;

    cookies.remove(Cookie::build(("access_token", "")).path("/").into());
    cookies.remove(Cookie::build(("refresh_token", "")).path("/").into());

    info!("User deleted: {} ({} sessions revoked)", caller.user_id, revoked);

    Ok(StatusCode::NO_CONTENT)
}

fn auth_response(tokens: TokenPair, user: User) -> AuthResponse {
    AuthResponse {
        access_token: tokens.access_token,
        csrf_token: tokens.csrf_token,
        user: UserProfile::from(user),
    }
}

fn set_cookies(cookies: &Cookies, tokens: &TokenPair) {
    let mut access_c = Cookie::new("access_token", tokens.access_token.clone());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(ACCESS_TOKEN_MINUTES));
    cookies.add(access_c);

    let mut refresh_c = Cookie::new("refresh_token", tokens.refresh_token.clone());
    refresh_c.set_http_only(true);
    refresh_c.set_secure(true);
    refresh_c.set_same_site(SameSite::Strict);
    refresh_c.set_path("/");
    refresh_c.set_max_age(Duration::days(REFRESH_TOKEN_DAYS));
    cookies.add(refresh_c);
}
