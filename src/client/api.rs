// src/client/api.rs
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::text::{SummarizeResponse, TranslateResponse};
use crate::api::users::MessageResponse;
use crate::auth::{AuthResponse, MeResponse};
use crate::model::{Article, Category, PublicUser};
use crate::services::FakeNewsVerdict;
use crate::store::ListQuery;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSummary {
    pub message: String,
    pub count: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

/// Typed HTTP client for the aggregator API.
#[derive(Clone)]
pub struct NewsClient {
    http: Client,
    base_url: String,
}

impl NewsClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("newsctl/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> ClientResult<T> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        let message = match resp.json::<ErrorBody>().await {
            Ok(b) => b.error,
            Err(_) => status.canonical_reason().unwrap_or("error").to_string(),
        };
        Err(ClientError::Api { status, message })
    }

    pub async fn news(&self, query: ListQuery) -> ClientResult<Vec<Article>> {
        Self::send(self.http.get(self.url("/api/news")).query(&query)).await
    }

    /// Most recent `n` articles; server-side sort and limit.
    pub async fn trending(&self, n: usize) -> ClientResult<Vec<Article>> {
        self.news(ListQuery::newest(n)).await
    }

    /// Everything published in the last `days` days, newest first.
    pub async fn missed(&self, days: u32) -> ClientResult<Vec<Article>> {
        self.news(ListQuery::within_days(days)).await
    }

    pub async fn news_by_category(
        &self,
        category: Category,
        query: ListQuery,
    ) -> ClientResult<Vec<Article>> {
        let url = self.url(&format!("/api/news/{category}"));
        Self::send(self.http.get(url).query(&query)).await
    }

    pub async fn article(&self, id: Uuid) -> ClientResult<Article> {
        Self::send(self.http.get(self.url(&format!("/api/news/id/{id}")))).await
    }

    pub async fn trigger_fetch(&self) -> ClientResult<FetchSummary> {
        Self::send(self.http.get(self.url("/api/news/fetch"))).await
    }

    pub async fn signup(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let body = json!({ "email": email, "password": password });
        Self::send(self.http.post(self.url("/api/auth/signup")).json(&body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let body = json!({ "email": email, "password": password });
        Self::send(self.http.post(self.url("/api/auth/login")).json(&body)).await
    }

    pub async fn me(&self, token: &str) -> ClientResult<PublicUser> {
        let resp: MeResponse =
            Self::send(self.http.get(self.url("/api/auth/me")).bearer_auth(token)).await?;
        Ok(resp.user)
    }

    pub async fn users(&self, token: &str) -> ClientResult<Vec<PublicUser>> {
        Self::send(self.http.get(self.url("/api/users")).bearer_auth(token)).await
    }

    pub async fn ban(&self, token: &str, user_id: Uuid) -> ClientResult<String> {
        let body = json!({ "userId": user_id });
        let resp: MessageResponse = Self::send(
            self.http
                .post(self.url("/api/users/ban"))
                .bearer_auth(token)
                .json(&body),
        )
        .await?;
        Ok(resp.message)
    }

    pub async fn summarize(&self, title: &str, text: &str) -> ClientResult<Vec<String>> {
        let body = json!({ "title": title, "text": text });
        let resp: SummarizeResponse =
            Self::send(self.http.post(self.url("/api/summarize")).json(&body)).await?;
        Ok(resp.summary)
    }

    pub async fn translate(&self, text: &str, to: &str) -> ClientResult<String> {
        let body = json!({ "text": text, "to": to });
        let resp: TranslateResponse =
            Self::send(self.http.post(self.url("/api/translate")).json(&body)).await?;
        Ok(resp.translated_text)
    }

    pub async fn detect_fake_news(&self, text: &str) -> ClientResult<FakeNewsVerdict> {
        let body = json!({ "text": text });
        Self::send(self.http.post(self.url("/detect-fake-news")).json(&body)).await
    }
}
