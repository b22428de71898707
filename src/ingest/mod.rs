// src/ingest/mod.rs
pub mod adapter;
pub mod providers;
pub mod scheduler;
pub mod types;

use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{AppConfig, IngestConfig};
use crate::ingest::providers::{gnews::GNewsProvider, newsapi::NewsApiProvider};
use crate::ingest::types::{NewsProvider, ProviderError, RawProviderArticle};
use crate::model::{Article, Category};
use crate::store::{ArticleStore, UpsertOutcome};

pub use scheduler::IngestService;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_runs_total", "Completed ingestion runs.");
        describe_counter!(
            "ingest_articles_fetched_total",
            "Raw articles returned by providers."
        );
        describe_counter!(
            "ingest_rejected_total",
            "Raw articles dropped by the adapter presence checks."
        );
        describe_counter!("ingest_upserts_total", "Article upserts by outcome.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch failures by provider."
        );
        describe_counter!(
            "ingest_fallback_total",
            "Categories served by the fallback provider."
        );
        describe_histogram!("ingest_fetch_ms", "Provider fetch time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when ingestion last ran.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Primary,
    Fallback,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOutcome {
    pub category: Category,
    pub source: FetchSource,
    pub articles: usize,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub fetched: usize,
    pub rejected: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    pub categories: Vec<CategoryOutcome>,
}

impl IngestReport {
    pub fn stored(&self) -> usize {
        self.inserted + self.updated
    }
}

#[derive(Debug, thiserror::Error)]
#[error("primary failed ({primary}); fallback: {}", fallback.as_ref().map(|e| e.to_string()).unwrap_or_else(|| "not configured".into()))]
struct FetchFailure {
    primary: ProviderError,
    fallback: Option<ProviderError>,
}

/// Fetch-and-upsert pipeline. Owns its store handle and providers; runs are
/// serialized within the process.
pub struct IngestJob {
    store: Arc<dyn ArticleStore>,
    primary: Option<Arc<dyn NewsProvider>>,
    fallback: Option<Arc<dyn NewsProvider>>,
    categories: Vec<Category>,
    country: Option<String>,
    run_lock: Mutex<()>,
}

impl IngestJob {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        primary: Option<Arc<dyn NewsProvider>>,
        fallback: Option<Arc<dyn NewsProvider>>,
        cfg: &IngestConfig,
    ) -> Self {
        Self {
            store,
            primary,
            fallback,
            categories: cfg.categories.clone(),
            country: cfg.country.clone(),
            run_lock: Mutex::new(()),
        }
    }

    /// Wire NewsAPI as primary and GNews as fallback from configured keys.
    pub fn from_config(store: Arc<dyn ArticleStore>, cfg: &AppConfig) -> Self {
        let primary = cfg
            .newsapi_key
            .as_ref()
            .map(|k| Arc::new(NewsApiProvider::new(k.clone(), &cfg.ingest)) as Arc<dyn NewsProvider>);
        let fallback = cfg
            .gnews_key
            .as_ref()
            .map(|k| Arc::new(GNewsProvider::new(k.clone(), &cfg.ingest)) as Arc<dyn NewsProvider>);
        if primary.is_none() {
            warn!("NEWSAPI_KEY not set; ingestion relies on the fallback provider");
        }
        Self::new(store, primary, fallback, &cfg.ingest)
    }

    async fn fetch_category(
        &self,
        category: Category,
    ) -> Result<(FetchSource, Vec<RawProviderArticle>), FetchFailure> {
        let primary_err = match &self.primary {
            Some(p) => match p.top_headlines(category).await {
                Ok(v) => return Ok((FetchSource::Primary, v)),
                Err(e) => {
                    warn!(%category, provider = p.name(), error = %e, "primary provider failed");
                    counter!("ingest_provider_errors_total", "provider" => p.name()).increment(1);
                    e
                }
            },
            None => ProviderError::NotConfigured,
        };

        let Some(fallback) = &self.fallback else {
            return Err(FetchFailure {
                primary: primary_err,
                fallback: None,
            });
        };

        match fallback.top_headlines(category).await {
            Ok(v) => {
                counter!("ingest_fallback_total").increment(1);
                Ok((FetchSource::Fallback, v))
            }
            Err(e) => {
                counter!("ingest_provider_errors_total", "provider" => fallback.name())
                    .increment(1);
                Err(FetchFailure {
                    primary: primary_err,
                    fallback: Some(e),
                })
            }
        }
    }

    /// Fetch every configured category, then upsert each normalized article on
    /// `(title, publishedAt)`. Provider and per-article store failures are
    /// logged and skipped; previously stored articles are never removed.
    #[instrument(skip(self), name = "ingest_run")]
    pub async fn run_once(&self) -> IngestReport {
        ensure_metrics_described();
        let _guard = self.run_lock.lock().await;

        let now = Utc::now();
        let mut report = IngestReport::default();
        let mut batch: Vec<Article> = Vec::new();

        for &category in &self.categories {
            info!(%category, "fetching headlines");
            match self.fetch_category(category).await {
                Ok((source, raws)) => {
                    let before = batch.len();
                    for raw in raws {
                        match adapter::to_article(raw, category, self.country.as_deref(), now) {
                            Ok(a) => batch.push(a),
                            Err(e) => {
                                debug!(%category, error = %e, "dropping raw article");
                                report.rejected += 1;
                            }
                        }
                    }
                    report.categories.push(CategoryOutcome {
                        category,
                        source,
                        articles: batch.len() - before,
                    });
                }
                Err(e) => {
                    error!(%category, error = %e, "category fetch failed; stored articles kept");
                    report.categories.push(CategoryOutcome {
                        category,
                        source: FetchSource::Failed,
                        articles: 0,
                    });
                }
            }
        }
        report.fetched = batch.len();
        counter!("ingest_rejected_total").increment(report.rejected as u64);

        for article in &batch {
            match self.store.upsert(article).await {
                Ok(UpsertOutcome::Inserted(_)) => report.inserted += 1,
                Ok(UpsertOutcome::Updated(_)) => report.updated += 1,
                Err(e) => {
                    error!(title = %article.title, error = %e, "upsert failed; skipping");
                    report.failed += 1;
                }
            }
        }

        counter!("ingest_upserts_total", "outcome" => "inserted").increment(report.inserted as u64);
        counter!("ingest_upserts_total", "outcome" => "updated").increment(report.updated as u64);
        counter!("ingest_upserts_total", "outcome" => "failed").increment(report.failed as u64);
        counter!("ingest_runs_total").increment(1);
        gauge!("ingest_last_run_ts").set(now.timestamp() as f64);

        info!(
            fetched = report.fetched,
            inserted = report.inserted,
            updated = report.updated,
            failed = report.failed,
            "updated and stored news articles"
        );
        report
    }
}
