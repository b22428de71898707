// src/services/mod.rs
//! Stateless pass-throughs to third-party text services.
//!
//! Every call has a fixed timeout and no retry. Upstream 401 surfaces as
//! [`ServiceError::InvalidCredentials`]; any other failure (timeout, non-2xx,
//! empty payload) is [`ServiceError::Failed`].

pub mod fake_news;
pub mod summarize;
pub mod translate;

use metrics::counter;

pub use fake_news::{FakeNewsDetector, FakeNewsLabel, FakeNewsVerdict, RandomDetector};
pub use summarize::{HuggingFaceSummarizer, Summarizer};
pub use translate::{truncate_chars, MyMemoryTranslator, Translator, MAX_TRANSLATE_CHARS};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0} service is not configured")]
    NotConfigured(&'static str),
    #[error("{service} failed: {reason}")]
    Failed {
        service: &'static str,
        reason: String,
    },
}

impl ServiceError {
    pub(crate) fn failed(service: &'static str, reason: impl ToString) -> Self {
        ServiceError::Failed {
            service,
            reason: reason.to_string(),
        }
    }

    /// Map a transport-level error; timeouts and connection errors are plain failures.
    pub(crate) fn from_reqwest(service: &'static str, e: reqwest::Error) -> Self {
        if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            return ServiceError::InvalidCredentials(format!("Invalid {service} credentials"));
        }
        if e.is_timeout() {
            return ServiceError::failed(service, "timed out");
        }
        ServiceError::failed(service, e)
    }
}

/// Count one auxiliary call by outcome.
pub(crate) fn record_outcome<T>(service: &'static str, res: &Result<T, ServiceError>) {
    let outcome = match res {
        Ok(_) => "ok",
        Err(ServiceError::InvalidCredentials(_)) => "unauthorized",
        Err(ServiceError::NotConfigured(_)) => "not_configured",
        Err(ServiceError::Failed { .. }) => "failed",
    };
    counter!("text_service_requests_total", "service" => service, "outcome" => outcome)
        .increment(1);
}
