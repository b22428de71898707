// src/services/summarize.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{record_outcome, ServiceError};

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";
const TIMEOUT: Duration = Duration::from_secs(10);
const SERVICE: &str = "summarize";

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Bullet-point summary of an article.
    async fn summarize(&self, title: &str, text: &str) -> Result<Vec<String>, ServiceError>;
}

/// Hugging Face inference API (BART CNN).
pub struct HuggingFaceSummarizer {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct Params {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

#[derive(Serialize)]
struct Req<'a> {
    inputs: &'a str,
    parameters: Params,
}

#[derive(Deserialize)]
struct Item {
    summary_text: String,
}

impl HuggingFaceSummarizer {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn call(&self, title: &str, text: &str) -> Result<Vec<String>, ServiceError> {
        let token = self
            .token
            .as_deref()
            .ok_or(ServiceError::NotConfigured("summarization"))?;

        let input = format!("Article Title: {title}\n\n{text}");
        let req = Req {
            inputs: &input,
            parameters: Params {
                max_length: 100,
                min_length: 30,
                do_sample: false,
            },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .timeout(TIMEOUT)
            .json(&req)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(SERVICE, e))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(ServiceError::InvalidCredentials(
                    "Invalid Hugging Face API token".into(),
                ))
            }
            s if !s.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                return Err(ServiceError::failed(SERVICE, format!("{s}: {body}")));
            }
            _ => {}
        }

        let items: Vec<Item> = resp
            .json()
            .await
            .map_err(|e| ServiceError::failed(SERVICE, e))?;
        let summary = items
            .into_iter()
            .next()
            .map(|i| i.summary_text)
            .ok_or_else(|| ServiceError::failed(SERVICE, "empty response"))?;

        let points = split_points(&summary);
        if points.is_empty() {
            return Err(ServiceError::failed(SERVICE, "empty summary"));
        }
        Ok(points)
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    async fn summarize(&self, title: &str, text: &str) -> Result<Vec<String>, ServiceError> {
        let res = self.call(title, text).await;
        record_outcome(SERVICE, &res);
        res
    }
}

/// Split a summary into sentences on `". "`; each point ends with one period.
pub fn split_points(summary: &str) -> Vec<String> {
    summary
        .split(". ")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.ends_with('.') {
                p.to_string()
            } else {
                format!("{p}.")
            }
        })
        .collect()
}
