// src/api/news.rs
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::extract::ApiQuery;
use crate::error::{ApiError, ApiResult};
use crate::ingest::CategoryOutcome;
use crate::model::{Article, Category};
use crate::state::AppState;
use crate::store::ListQuery;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/news", get(list_news))
        .route("/api/news/fetch", get(fetch_news))
        .route("/api/news/id/{id}", get(news_by_id))
        .route("/api/news/{category}", get(news_by_category))
}

#[instrument(skip(state))]
async fn list_news(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Article>>> {
    Ok(Json(state.articles.list_all(query).await?))
}

#[instrument(skip(state))]
async fn news_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Article>>> {
    let category: Category = category
        .parse()
        .map_err(|e: crate::model::UnknownCategory| ApiError::validation(e.to_string()))?;
    Ok(Json(state.articles.find_by_category(category, query).await?))
}

#[instrument(skip(state))]
async fn news_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Article>> {
    let not_found = || ApiError::not_found("News not found");
    let id = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;
    state
        .articles
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub message: String,
    pub count: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    pub categories: Vec<CategoryOutcome>,
}

/// Manual ingestion trigger. Waits behind a scheduled run if one is active.
#[instrument(skip(state))]
async fn fetch_news(State(state): State<AppState>) -> Json<FetchResponse> {
    let report = state.ingest.run_once().await;
    info!(stored = report.stored(), "manual ingestion finished");
    Json(FetchResponse {
        message: format!("Updated and stored {} news articles", report.stored()),
        count: report.stored(),
        inserted: report.inserted,
        updated: report.updated,
        failed: report.failed,
        categories: report.categories,
    })
}
