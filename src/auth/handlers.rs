// src/auth/handlers.rs
use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::extractors::AuthUser;
use super::password::{hash_password, verify_password};
use crate::api::extract::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::model::{PublicUser, Role, User};
use crate::state::AppState;

pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|e| panic!("email regex: {e}"))
});

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<Credentials>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let role = if state.config.is_admin_email(&payload.email) {
        Role::Admin
    } else {
        Role::User
    };
    let user = User {
        id: Uuid::new_v4(),
        email: payload.email,
        password_hash: hash_password(&payload.password)?,
        role,
        created_at: Utc::now(),
    };
    // A concurrent signup can still win the race; the store reports Conflict.
    state.users.create(&user).await?;

    let token = state.jwt.sign(user.id)?;
    info!(user_id = %user.id, role = user.role.as_str(), "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<Credentials>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();
    let invalid = || ApiError::InvalidCredentials("Invalid credentials".into());

    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(invalid());
    };
    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let token = state.jwt.sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip_all)]
pub async fn me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: PublicUser::from(&user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two words@x.io"));
        assert!(!is_valid_email("a@nodot"));
    }
}
