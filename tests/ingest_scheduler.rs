// tests/ingest_scheduler.rs
//
// Periodic ingestion under tokio's paused clock: one run at start, then one per
// interval, and a clean stop.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::StubProvider;
use news_aggregator::config::IngestConfig;
use news_aggregator::ingest::{IngestJob, IngestService};
use news_aggregator::model::Category;
use news_aggregator::store::{ArticleStore, MemoryStore};

fn job(provider: Arc<StubProvider>, store: Arc<MemoryStore>) -> Arc<IngestJob> {
    let cfg = IngestConfig {
        categories: vec![Category::General],
        ..IngestConfig::default()
    };
    Arc::new(IngestJob::new(store, Some(provider), None, &cfg))
}

#[tokio::test(start_paused = true)]
async fn runs_immediately_then_every_interval() {
    let provider = Arc::new(StubProvider::new("primary", 1));
    let store = Arc::new(MemoryStore::new());
    let svc = IngestService::start(job(provider.clone(), store.clone()), Duration::from_secs(3600));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(provider.call_count(), 1, "first run happens at start-up");
    assert_eq!(store.count().await.unwrap(), 1);

    tokio::time::sleep(Duration::from_secs(7200)).await;
    assert_eq!(provider.call_count(), 3);
    // Same key every run: still one stored article.
    assert_eq!(store.count().await.unwrap(), 1);

    assert!(svc.is_running());
    svc.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_ends_the_loop() {
    let provider = Arc::new(StubProvider::new("primary", 1));
    let svc = IngestService::start(
        job(provider.clone(), Arc::new(MemoryStore::new())),
        Duration::from_secs(60),
    );
    tokio::time::sleep(Duration::from_secs(1)).await;
    svc.stop().await;

    let runs = provider.call_count();
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(provider.call_count(), runs, "no runs after stop");
}
