// src/auth/extractors.rs
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::error::ApiError;
use crate::model::{Role, User};
use crate::state::AppState;

/// Caller with a valid bearer token whose user still exists.
pub struct AuthUser(pub User);

/// [`AuthUser`] whose role is admin.
pub struct AdminUser(pub User);

fn bearer(parts: &Parts) -> Result<&str, ApiError> {
    let auth = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer(parts)?;

        let claims = state.jwt.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        // Banned users are deleted, so their still-valid tokens stop here.
        let user = state.users.find_by_id(claims.sub).await?.ok_or_else(|| {
            warn!(user_id = %claims.sub, "token for unknown user");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthUser(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, "admin route denied");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
