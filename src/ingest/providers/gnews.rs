// src/ingest/providers/gnews.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::classify_status;
use crate::config::IngestConfig;
use crate::ingest::types::{GNewsArticle, NewsProvider, ProviderError, RawProviderArticle};
use crate::model::Category;

pub const DEFAULT_BASE_URL: &str = "https://gnews.io/api/v4";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    articles: Option<Vec<GNewsArticle>>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

/// Fallback provider: GNews `top-headlines`.
#[derive(Clone)]
pub struct GNewsProvider {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    country: Option<String>,
    timeout: Duration,
}

impl GNewsProvider {
    pub fn new(api_key: impl Into<String>, cfg: &IngestConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            language: cfg.language.clone(),
            country: cfg.country.clone(),
            timeout: cfg.timeout(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn errors_to_message(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        serde_json::Value::Object(map) => map
            .values()
            .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[async_trait]
impl NewsProvider for GNewsProvider {
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
            ("lang", self.language.as_str()),
            ("apikey", self.api_key.as_str()),
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
            Err(_) => return Err(classify_status(status, String::new())),
        };

        if !status.is_success() {
            let message = body.errors.as_ref().map(errors_to_message).unwrap_or_default();
            return Err(classify_status(status, message));
        }

        let articles = body
            .articles
            .ok_or_else(|| ProviderError::Shape("missing 'articles'".into()))?;

        histogram!("ingest_fetch_ms", "provider" => "gnews")
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_articles_fetched_total", "provider" => "gnews")
            .increment(articles.len() as u64);

        Ok(articles.into_iter().map(RawProviderArticle::GNews).collect())
    }

    fn name(&self) -> &'static str {
        "gnews"
    }
}
