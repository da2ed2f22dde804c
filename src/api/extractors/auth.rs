use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts, Method},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::Role;
use crate::domain::services::access_policy::Caller;
use crate::domain::services::auth_service::ACCESS_TOKEN_AUDIENCE;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{Span, warn};

/// The authenticated caller.
///
/// Accepts either an `access_token` cookie or an `Authorization: Bearer`
/// header. Cookie sessions must echo the token's CSRF value in
/// `X-CSRF-Token` on every non-safe method; bearer callers are exempt.
pub struct AuthUser(pub Caller);

enum TokenSource {
    Bearer(String),
    Cookie(String),
}

fn find_token(parts: &Parts) -> Result<TokenSource, AppError> {
    if let Some(header) = parts.headers.get(AUTHORIZATION)
        && let Ok(value) = header.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Ok(TokenSource::Bearer(token.trim().to_string()));
    }

    let cookies = parts.extensions.get::<Cookies>()
        .ok_or(AppError::InternalWithMsg("Cookie layer missing".into()))?;

    cookies.get("access_token")
        .map(|c| TokenSource::Cookie(c.value().to_string()))
        .ok_or(AppError::Unauthorized)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let source = find_token(parts)?;
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid JWT public key PEM: {}", e)))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[ACCESS_TOKEN_AUDIENCE]);
        validation.set_issuer(&[app_state.config.auth_issuer.as_str()]);

        let raw_token = match &source {
            TokenSource::Bearer(t) | TokenSource::Cookie(t) => t,
        };
        let token_data = decode::<Claims>(raw_token, &decoding_key, &validation)
            .map_err(|_| AppError::Unauthorized)?;

        let method = &parts.method;
        let is_safe = method == Method::GET || method == Method::HEAD || method == Method::OPTIONS;
        if matches!(source, TokenSource::Cookie(_)) && !is_safe {
            let csrf_header_val = parts.headers.get("X-CSRF-Token")
                .and_then(|v| v.to_str().ok())
                .ok_or(AppError::forbidden("Missing CSRF token"))?;

            if csrf_header_val != token_data.claims.csrf_token {
                return Err(AppError::forbidden("Invalid CSRF token"));
            }
        }

        let role = token_data.claims.role.parse::<Role>()
            .map_err(|e| {
                warn!("Rejected token for {}: {}", token_data.claims.sub, e);
                AppError::forbidden("Unknown role")
            })?;

        Span::current().record("user_id", &token_data.claims.sub);

        Ok(AuthUser(Caller::new(token_data.claims.sub, role)))
    }
}
