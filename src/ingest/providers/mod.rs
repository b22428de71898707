// src/ingest/providers/mod.rs
pub mod gnews;
pub mod newsapi;

use crate::ingest::types::ProviderError;

/// Map a non-2xx upstream status to a provider error. Quota exhaustion is kept
/// apart so operators can tell it from outages.
pub(crate) fn classify_status(status: reqwest::StatusCode, message: String) -> ProviderError {
    let lower = message.to_ascii_lowercase();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || lower.contains("ratelimited")
        || lower.contains("rate limit")
        || lower.contains("request limit")
        || lower.contains("too many requests")
    {
        return ProviderError::Quota(message);
    }
    ProviderError::Status {
        status: status.as_u16(),
        message,
    }
}
