// src/services/translate.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{record_outcome, ServiceError};

pub const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net/get";
pub const MAX_TRANSLATE_CHARS: usize = 1000;
const TIMEOUT: Duration = Duration::from_secs(5);
const SERVICE: &str = "translate";

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate English `text` into `to`. Callers truncate first; see [`truncate_chars`].
    async fn translate(&self, text: &str, to: &str) -> Result<String, ServiceError>;
}

/// First `max` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct MyMemoryTranslator {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
}

#[derive(Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

impl Default for MyMemoryTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl MyMemoryTranslator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn call(&self, text: &str, to: &str) -> Result<String, ServiceError> {
        let langpair = format!("en|{to}");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(SERVICE, e))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(ServiceError::InvalidCredentials(
                    "Invalid translation credentials".into(),
                ))
            }
            s if !s.is_success() => return Err(ServiceError::failed(SERVICE, s)),
            _ => {}
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| ServiceError::failed(SERVICE, e))?;
        body.response_data
            .and_then(|d| d.translated_text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ServiceError::failed(SERVICE, "Translation not available"))
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(&self, text: &str, to: &str) -> Result<String, ServiceError> {
        let res = self.call(text, to).await;
        record_outcome(SERVICE, &res);
        res
    }
}
