// src/ingest/types.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::model::Category;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider not configured")]
    NotConfigured,
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("quota exhausted: {0}")]
    Quota(String),
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected payload: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Shape(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

/// Upstream `source` is an object on both providers, but older payloads carry a
/// bare string.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SourceField {
    Named {
        #[serde(default)]
        name: Option<String>,
    },
    Plain(String),
}

impl SourceField {
    pub fn name(&self) -> Option<&str> {
        match self {
            SourceField::Named { name } => name.as_deref(),
            SourceField::Plain(s) => Some(s.as_str()),
        }
    }
}

/// Article as returned by NewsAPI `top-headlines`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    #[serde(default)]
    pub source: Option<SourceField>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Article as returned by GNews `top-headlines`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GNewsArticle {
    #[serde(default)]
    pub source: Option<SourceField>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    /// Older payloads name the timestamp `published`; some carry both keys.
    #[serde(default)]
    pub published: Option<String>,
}

/// One raw upstream record, tagged by the provider it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawProviderArticle {
    NewsApi(NewsApiArticle),
    GNews(GNewsArticle),
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn top_headlines(
        &self,
        category: Category,
    ) -> Result<Vec<RawProviderArticle>, ProviderError>;
    fn name(&self) -> &'static str;
}
