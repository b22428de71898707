// src/api/users.rs
use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::api::extract::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::model::PublicUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/ban", post(ban_user))
}

#[instrument(skip_all)]
async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = state.users.list().await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Deletes the account; outstanding tokens stop working on their next use.
#[instrument(skip_all)]
async fn ban_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<BanRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::validation("userId is required"));
    }
    let not_found = || ApiError::not_found("User not found");
    let id = Uuid::parse_str(req.user_id.trim()).map_err(|_| not_found())?;

    if !state.users.delete(id).await? {
        return Err(not_found());
    }
    info!(admin_id = %admin.id, user_id = %id, "user banned");
    Ok(Json(MessageResponse {
        message: "User banned successfully".into(),
    }))
}
