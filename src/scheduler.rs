// src/scheduler.rs
//! Background pipeline runs on a fixed interval. The pipeline is idempotent,
//! so an overlapping manual `/api/scrape` run at worst inserts zero rows.

use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::ingest::types::TextSource;
use crate::pipeline::run_pipeline;
use crate::sentiment::SentimentScorer;
use crate::store::SignalStore;
use crate::vocab::Vocabulary;

/// Spawn the interval scheduler. Returns `None` when `interval_secs` is 0.
pub fn spawn_pipeline_scheduler(
    interval_secs: u64,
    sources: Arc<Vec<Box<dyn TextSource>>>,
    scorer: Arc<SentimentScorer>,
    vocab: Arc<Vocabulary>,
    store: Arc<SignalStore>,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("pipeline scheduler disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            match run_pipeline(&sources, &scorer, &vocab, &store).await {
                Ok(stats) => {
                    tracing::info!(
                        target: "scheduler",
                        mentions = stats.mentions_inserted,
                        options = stats.options_inserted,
                        elapsed = stats.elapsed_seconds,
                        "scheduled pipeline tick"
                    );
                }
                Err(e) => {
                    tracing::warn!(target: "scheduler", error = ?e, "scheduled pipeline failed");
                    counter!("pipeline_failures_total").increment(1);
                }
            }
        }
    }))
}
