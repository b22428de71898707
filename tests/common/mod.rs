// tests/common/mod.rs
//
// Shared helpers for the integration tests: request plumbing over the in-process
// Router and scriptable stand-ins for the upstream providers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`
use uuid::Uuid;

use news_aggregator::ingest::types::{NewsApiArticle, NewsProvider, ProviderError, RawProviderArticle, SourceField};
use news_aggregator::model::{Article, Category};
use news_aggregator::store::{ArticleStore, ListQuery, MemoryStore, StoreError, StoreResult, UpsertOutcome};

const BODY_LIMIT: usize = 1024 * 1024;

/// Fire one request through the router and decode the JSON body (Null when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Json>,
    token: Option<&str>,
) -> (StatusCode, Json) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("build request");

    dispatch(app, req).await
}

/// Send a body verbatim, for payloads that are not valid JSON.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Json) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        req = req.header("content-type", ct);
    }
    let req = req.body(Body::from(body.to_string())).expect("build request");
    dispatch(app, req).await
}

async fn dispatch(app: &Router, req: Request<Body>) -> (StatusCode, Json) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Json::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

/// Sign up and return the bearer token.
pub async fn signup(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/signup",
        Some(serde_json::json!({ "email": email, "password": "secret123" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

pub fn article(title: &str, category: Category, minute: u32) -> Article {
    Article {
        id: Uuid::new_v4(),
        title: title.to_string(),
        source: "Test Wire".into(),
        image: None,
        description: Some(format!("{title} description")),
        content: None,
        published_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
        country: None,
        category,
    }
}

fn raw(title: String, minute: usize) -> RawProviderArticle {
    RawProviderArticle::NewsApi(NewsApiArticle {
        source: Some(SourceField::Named {
            name: Some("Stub Wire".into()),
        }),
        title: Some(title),
        description: Some("desc".into()),
        published_at: Some(format!("2024-05-01T12:{:02}:00Z", minute % 60)),
        ..Default::default()
    })
}

/// Provider returning `per_category` articles titled `"{label} {category} {i}"`,
/// failing with 503 for the categories listed in `down`.
pub struct StubProvider {
    pub label: &'static str,
    pub per_category: usize,
    pub down: Vec<Category>,
    pub calls: Mutex<Vec<Category>>,
    pub runs: AtomicUsize,
}

impl StubProvider {
    pub fn new(label: &'static str, per_category: usize) -> Self {
        Self {
            label,
            per_category,
            down: Vec::new(),
            calls: Mutex::new(Vec::new()),
            runs: AtomicUsize::new(0),
        }
    }

    pub fn down_for(mut self, categories: &[Category]) -> Self {
        self.down = categories.to_vec();
        self
    }

    pub fn calls(&self) -> Vec<Category> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsProvider for StubProvider {
    async fn top_headlines(
        &self,
        category: Category,
    ) -> Result<Vec<RawProviderArticle>, ProviderError> {
        self.calls.lock().push(category);
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.down.contains(&category) {
            return Err(ProviderError::Status {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok((0..self.per_category)
            .map(|i| raw(format!("{} {} {}", self.label, category, i), i))
            .collect())
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

/// Article store whose upserts fail for titles ending in `" 0"`; everything
/// else goes to an inner [`MemoryStore`].
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub rejected: Mutex<Vec<String>>,
}

#[async_trait]
impl ArticleStore for FlakyStore {
    async fn list_all(&self, query: ListQuery) -> StoreResult<Vec<Article>> {
        self.inner.list_all(query).await
    }

    async fn find_by_category(
        &self,
        category: Category,
        query: ListQuery,
    ) -> StoreResult<Vec<Article>> {
        self.inner.find_by_category(category, query).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Article>> {
        ArticleStore::find_by_id(&self.inner, id).await
    }

    async fn upsert(&self, article: &Article) -> StoreResult<UpsertOutcome> {
        if article.title.ends_with(" 0") {
            self.rejected.lock().push(article.title.clone());
            return Err(StoreError::Write("disk full".into()));
        }
        self.inner.upsert(article).await
    }

    async fn replace_all(&self, articles: &[Article]) -> StoreResult<usize> {
        self.inner.replace_all(articles).await
    }

    async fn count(&self) -> StoreResult<usize> {
        self.inner.count().await
    }
}
