// src/ingest/providers/newsapi.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::classify_status;
use crate::config::IngestConfig;
use crate::ingest::types::{NewsApiArticle, NewsProvider, ProviderError, RawProviderArticle};
use crate::model::Category;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Option<Vec<NewsApiArticle>>,
}

/// Primary provider: NewsAPI `top-headlines`.
#[derive(Clone)]
pub struct NewsApiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    country: Option<String>,
    timeout: Duration,
}

impl NewsApiProvider {
    pub fn new(api_key: impl Into<String>, cfg: &IngestConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            country: cfg.country.clone(),
            timeout: cfg.timeout(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn top_headlines(
        &self,
        category: Category,
    ) -> Result<Vec<RawProviderArticle>, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured);
        }
        let t0 = std::time::Instant::now();

        let mut query: Vec<(&str, &str)> = vec![
            ("category", category.as_str()),
            ("apiKey", self.api_key.as_str()),
        ];
        if let Some(country) = self.country.as_deref() {
            query.push(("country", country));
        }

        let resp = self
            .client
            .get(format!("{}/top-headlines", self.base_url))
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        let body: Envelope = match resp.json().await {
            Ok(b) => b,
            Err(e) if status.is_success() => return Err(ProviderError::Shape(e.to_string())),
            Err(_) => {
                return Err(classify_status(status, String::new()));
            }
        };

        // NewsAPI reports failures as {"status":"error","code":..,"message":..}.
        if !status.is_success() || body.status.as_deref() == Some("error") {
            let message = format!(
                "{}: {}",
                body.code.as_deref().unwrap_or("error"),
                body.message.as_deref().unwrap_or_default()
            );
            return Err(classify_status(status, message));
        }

        let articles = body
            .articles
            .ok_or_else(|| ProviderError::Shape("missing 'articles'".into()))?;

        histogram!("ingest_fetch_ms", "provider" => "newsapi")
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_articles_fetched_total", "provider" => "newsapi")
            .increment(articles.len() as u64);

        Ok(articles.into_iter().map(RawProviderArticle::NewsApi).collect())
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
