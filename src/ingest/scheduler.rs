// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::IngestJob;

/// Background loop that runs the ingest job once at start-up and then on a
/// fixed period. Runs never overlap: the loop awaits each run before ticking.
pub struct IngestService {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl IngestService {
    pub fn start(job: Arc<IngestJob>, every: Duration) -> Self {
        let (shutdown, mut rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                target: "ingest",
                every_secs = every.as_secs(),
                "ingest scheduler started"
            );
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = job.run_once().await;
                        tracing::debug!(target: "ingest", stored = report.stored(), "scheduled run done");
                    }
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!(target: "ingest", "ingest scheduler stopped");
        });
        Self { shutdown, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the loop and wait for it to exit. An in-flight run completes first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!(target: "ingest", error = %e, "ingest scheduler task ended abnormally");
        }
    }
}
