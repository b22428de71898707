// src/config/ingest.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::Category;

const ENV_PATH: &str = "INGEST_CONFIG_PATH";

pub const DEFAULT_INTERVAL_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_categories() -> Vec<Category> {
    Category::ALL.to_vec()
}
fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_language() -> String {
    "en".into()
}

/// Tuning for the ingestion job. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Passed to providers and stamped onto every article when set.
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            country: None,
            language: default_language(),
        }
    }
}

impl IngestConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading ingest config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse(&content, ext.as_str())
    }

    /// Load using env var + fallbacks:
    /// 1) $INGEST_CONFIG_PATH
    /// 2) config/ingest.toml
    /// 3) config/ingest.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("INGEST_CONFIG_PATH points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/ingest.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/ingest.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }
}

fn parse(s: &str, hint_ext: &str) -> Result<IngestConfig> {
    let cfg = if hint_ext == "json" {
        serde_json::from_str::<IngestConfig>(s)?
    } else {
        match toml::from_str::<IngestConfig>(s) {
            Ok(c) => c,
            Err(toml_err) => serde_json::from_str::<IngestConfig>(s)
                .map_err(|_| anyhow!("unsupported ingest config format: {toml_err}"))?,
        }
    };
    Ok(clean(cfg))
}

fn clean(mut cfg: IngestConfig) -> IngestConfig {
    let mut seen = Vec::with_capacity(cfg.categories.len());
    for c in cfg.categories {
        if !seen.contains(&c) {
            seen.push(c);
        }
    }
    cfg.categories = seen;
    cfg.country = cfg
        .country
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty());
    cfg
}
