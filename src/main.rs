//! WSB Sentiment Tracker binary entrypoint.
//! Boots the Axum HTTP server, the background scrape scheduler, and the
//! shared extraction state (vocabulary, scorer, store).

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wsb_sentiment_tracker::api::{self, AppState};
use wsb_sentiment_tracker::config::TrackerConfig;
use wsb_sentiment_tracker::earnings::EarningsOracle;
use wsb_sentiment_tracker::ingest::providers::prefetch::PrefetchMarketData;
use wsb_sentiment_tracker::ingest::providers::reddit::{FetchLimits, RedditSource};
use wsb_sentiment_tracker::ingest::types::TextSource;
use wsb_sentiment_tracker::scheduler::spawn_pipeline_scheduler;
use wsb_sentiment_tracker::sentiment::SentimentScorer;
use wsb_sentiment_tracker::store::SignalStore;
use wsb_sentiment_tracker::vocab::Vocabulary;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = TrackerConfig::from_env();
    tracing::info!(?cfg, "starting wsb-sentiment-tracker");

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("installing prometheus recorder")?;

    // --- Shared extraction state: build once, inject everywhere ---
    let vocab = Arc::new(Vocabulary::load(&cfg.sec_cache_path).await);
    let scorer = Arc::new(SentimentScorer::new());
    let store = Arc::new(SignalStore::open(&cfg.db_path)?);

    let reddit = RedditSource::new(cfg.subreddit_url.clone(), FetchLimits::default())
        .context("building reddit source")?;
    let sources: Arc<Vec<Box<dyn TextSource>>> = Arc::new(vec![Box::new(reddit)]);

    let market = Arc::new(PrefetchMarketData::from_path(&cfg.earnings_prefetch_path));
    let oracle = Arc::new(EarningsOracle::new(market, store.clone()));

    spawn_pipeline_scheduler(
        cfg.scrape_interval_secs,
        sources.clone(),
        scorer.clone(),
        vocab.clone(),
        store.clone(),
    );

    let state = AppState {
        store,
        scorer,
        vocab,
        sources,
        oracle,
        prometheus: Some(prometheus),
    };
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, router).await.context("serving")?;
    Ok(())
}
