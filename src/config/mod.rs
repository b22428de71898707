// src/config/mod.rs
pub mod ingest;

use anyhow::{Context, Result};
use serde::Deserialize;

pub use ingest::IngestConfig;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_JWT_TTL_MINUTES: i64 = 60 * 24 * 7;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Process configuration, read once from the environment (after `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Primary news provider key (NewsAPI).
    pub newsapi_key: Option<String>,
    /// Fallback news provider key (GNews).
    pub gnews_key: Option<String>,
    /// Hugging Face inference token for summarization.
    pub hf_token: Option<String>,
    pub allowed_origins: Vec<String>,
    pub admin_emails: Vec<String>,
    pub jwt: JwtConfig,
    pub ingest: IngestConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:news.db".into());
        let port = match non_empty("PORT") {
            Some(p) => p.parse::<u16>().context("PORT must be a port number")?,
            None => DEFAULT_PORT,
        };

        let mut allowed_origins = split_list(&std::env::var("FRONTEND_URLS").unwrap_or_default());
        if let Some(single) = non_empty("FRONTEND_URL") {
            if !allowed_origins.contains(&single) {
                allowed_origins.push(single);
            }
        }

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "news-aggregator".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "news-readers".into()),
            ttl_minutes: non_empty("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_JWT_TTL_MINUTES),
        };

        let ingest = IngestConfig::load_default().context("loading ingest config")?;

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            newsapi_key: non_empty("NEWSAPI_KEY"),
            gnews_key: non_empty("GNEWS_API_KEY"),
            hf_token: non_empty("HF_API_TOKEN"),
            allowed_origins,
            admin_emails: split_list(&std::env::var("ADMIN_EMAILS").unwrap_or_default())
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
            jwt,
            ingest,
        })
    }

    /// Config for tests and local tooling; nothing external is configured.
    pub fn for_tests() -> Self {
        Self {
            database_url: "memory".into(),
            host: "127.0.0.1".into(),
            port: 0,
            newsapi_key: None,
            gnews_key: None,
            hf_token: None,
            allowed_origins: Vec::new(),
            admin_emails: vec!["admin@example.com".into()],
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            ingest: IngestConfig::default(),
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e.eq_ignore_ascii_case(email))
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(" https://a.app , ,https://b.app"),
            vec!["https://a.app".to_string(), "https://b.app".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[serial_test::serial]
    #[test]
    fn from_env_reads_keys_and_origins() {
        env::set_var("JWT_SECRET", "s3cret");
        env::set_var("PORT", "8088");
        env::set_var("NEWSAPI_KEY", "primary");
        env::remove_var("GNEWS_API_KEY");
        env::set_var("FRONTEND_URLS", "https://a.app");
        env::set_var("FRONTEND_URL", "https://b.app");
        env::set_var("ADMIN_EMAILS", "Boss@Example.com");

        let cfg = AppConfig::from_env().expect("config");
        assert_eq!(cfg.port, 8088);
        assert_eq!(cfg.newsapi_key.as_deref(), Some("primary"));
        assert!(cfg.gnews_key.is_none());
        assert_eq!(cfg.allowed_origins, vec!["https://a.app", "https://b.app"]);
        assert!(cfg.is_admin_email("boss@example.com"));

        for k in [
            "JWT_SECRET",
            "PORT",
            "NEWSAPI_KEY",
            "FRONTEND_URLS",
            "FRONTEND_URL",
            "ADMIN_EMAILS",
        ] {
            env::remove_var(k);
        }
    }

    #[serial_test::serial]
    #[test]
    fn missing_jwt_secret_is_an_error() {
        env::remove_var("JWT_SECRET");
        assert!(AppConfig::from_env().is_err());
    }
}
