// src/api/text.rs
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::extract::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::services::{truncate_chars, FakeNewsVerdict, MAX_TRANSLATE_CHARS};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/detect-fake-news", post(detect_fake_news))
        .route("/api/summarize", post(summarize))
        .route("/api/translate", post(translate))
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub text: String,
}

#[instrument(skip_all)]
async fn detect_fake_news(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DetectRequest>,
) -> ApiResult<Json<FakeNewsVerdict>> {
    if blank(&req.text) {
        return Err(ApiError::validation("Text is required"));
    }
    Ok(Json(state.detector.classify(&req.text)))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: Vec<String>,
}

#[instrument(skip_all)]
async fn summarize(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SummarizeRequest>,
) -> ApiResult<Json<SummarizeResponse>> {
    if blank(&req.text) || blank(&req.title) {
        return Err(ApiError::validation("Text and title are required"));
    }
    let summary = state.summarizer.summarize(&req.title, &req.text).await?;
    Ok(Json(SummarizeResponse { summary }))
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}

#[instrument(skip_all)]
async fn translate(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TranslateRequest>,
) -> ApiResult<Json<TranslateResponse>> {
    if blank(&req.text) || blank(&req.to) {
        return Err(ApiError::validation("Text and target language are required"));
    }
    let text = truncate_chars(&req.text, MAX_TRANSLATE_CHARS);
    let translated_text = state.translator.translate(text, req.to.trim()).await?;
    // Translators must never hand back an empty success.
    if blank(&translated_text) {
        return Err(ApiError::ServiceFailed("Failed to translate text".into()));
    }
    Ok(Json(TranslateResponse { translated_text }))
}
