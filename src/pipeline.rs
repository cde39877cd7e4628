//! # Pipeline Orchestrator
//! Fans fetched text units through ticker extraction, sentiment scoring, and
//! options extraction, then batch-appends the resulting event rows. Safe to
//! re-run: inserts are idempotent, duplicates are silently dropped.

use std::time::Instant;

use anyhow::Result;
use metrics::{counter, gauge};
use serde::Serialize;

use crate::ingest::types::{SourceType, TextSource, TextUnit};
use crate::ingest::{normalize_text, snippet};
use crate::options::extract_options;
use crate::sentiment::SentimentScorer;
use crate::store::{MentionRow, OptionEventRow, SignalStore};
use crate::tickers::extract_tickers;
use crate::vocab::Vocabulary;

/// Mention title snippets are capped at this many characters.
const TITLE_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PipelineStats {
    pub posts_fetched: usize,
    pub comments_fetched: usize,
    pub mentions_found: usize,
    pub mentions_inserted: usize,
    pub options_found: usize,
    pub options_inserted: usize,
    pub elapsed_seconds: f64,
}

/// Run the full fetch-extract-score-store pipeline once.
///
/// Per-source fetch errors degrade the run to partial results (logged,
/// counted, skipped); a storage error aborts the run. Sentiment is scored
/// once per text unit and attached to every row built from that unit.
pub async fn run_pipeline(
    sources: &[Box<dyn TextSource>],
    scorer: &SentimentScorer,
    vocab: &Vocabulary,
    store: &SignalStore,
) -> Result<PipelineStats> {
    let started = Instant::now();

    // 1) Fetch
    let mut units: Vec<TextUnit> = Vec::new();
    for src in sources {
        match src.fetch_latest().await {
            Ok(mut batch) => {
                tracing::info!(source = src.name(), fetched = batch.len(), "source fetched");
                units.append(&mut batch);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = src.name(), "source error");
                counter!("pipeline_source_errors_total").increment(1);
            }
        }
    }

    // 2) Extract + score, building both event streams
    let mut mention_rows: Vec<MentionRow> = Vec::new();
    let mut option_rows: Vec<OptionEventRow> = Vec::new();

    for unit in &units {
        let blob = normalize_text(&format!("{} {}", unit.title, unit.body));
        let tickers = extract_tickers(&blob, vocab);
        let sentiment = scorer.score(&blob);

        let snippet_src = if unit.title.is_empty() {
            &unit.body
        } else {
            &unit.title
        };
        for ticker in tickers {
            mention_rows.push(MentionRow {
                ticker,
                source_id: unit.id.clone(),
                sentiment_score: sentiment,
                timestamp: unit.created_at,
                source_type: unit.source_type,
                title_snippet: snippet(snippet_src, TITLE_SNIPPET_CHARS),
                author: unit.author.clone(),
                upvotes: unit.upvotes,
            });
        }

        // Options signal is independent of whether any ticker was mentioned
        for candidate in extract_options(&blob, vocab) {
            option_rows.push(OptionEventRow {
                candidate,
                source_id: unit.id.clone(),
                sentiment_score: sentiment,
                timestamp: unit.created_at,
                author: unit.author.clone(),
                upvotes: unit.upvotes,
            });
        }
    }

    // 3) Store (mentions first, then options; both idempotent)
    let mentions_inserted = store.insert_mentions(&mention_rows)?;
    let options_inserted = store.insert_options(&option_rows)?;

    let stats = PipelineStats {
        posts_fetched: units
            .iter()
            .filter(|u| u.source_type == SourceType::Post)
            .count(),
        comments_fetched: units
            .iter()
            .filter(|u| u.source_type == SourceType::Comment)
            .count(),
        mentions_found: mention_rows.len(),
        mentions_inserted,
        options_found: option_rows.len(),
        options_inserted,
        elapsed_seconds: (started.elapsed().as_secs_f64() * 10.0).round() / 10.0,
    };

    counter!("pipeline_runs_total").increment(1);
    counter!("pipeline_mentions_inserted_total").increment(mentions_inserted as u64);
    counter!("pipeline_options_inserted_total").increment(options_inserted as u64);
    gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    tracing::info!(
        posts = stats.posts_fetched,
        comments = stats.comments_fetched,
        mentions_found = stats.mentions_found,
        mentions_inserted = stats.mentions_inserted,
        options_found = stats.options_found,
        options_inserted = stats.options_inserted,
        elapsed = stats.elapsed_seconds,
        "pipeline run complete"
    );

    Ok(stats)
}
