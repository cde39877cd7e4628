//! HTTP boundary: aggregation query results served exactly as the store
//! shapes them, plus a manual pipeline trigger. Failures surface as an
//! `error` field in a well-formed body, never as a bare 500.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::earnings::EarningsOracle;
use crate::ingest::types::TextSource;
use crate::pipeline::run_pipeline;
use crate::sentiment::SentimentScorer;
use crate::store::SignalStore;
use crate::vocab::Vocabulary;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SignalStore>,
    pub scorer: Arc<SentimentScorer>,
    pub vocab: Arc<Vocabulary>,
    pub sources: Arc<Vec<Box<dyn TextSource>>>,
    pub oracle: Arc<EarningsOracle>,
    pub prometheus: Option<PrometheusHandle>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/tickers", get(api_tickers))
        .route("/api/ticker/{symbol}", get(api_ticker_detail))
        .route("/api/options", get(api_options))
        .route("/api/status", get(api_status))
        .route("/api/earnings/{symbol}", get(api_earnings))
        .route("/api/scrape", post(api_scrape))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct WindowParams {
    hours: Option<u64>,
    limit: Option<u32>,
}

impl WindowParams {
    fn hours(&self) -> u64 {
        self.hours.unwrap_or(24).clamp(1, 168)
    }
    fn limit(&self, default: u32, max: u32) -> u32 {
        self.limit.unwrap_or(default).clamp(1, max)
    }
}

async fn api_tickers(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Json<Value> {
    let hours = params.hours();
    let limit = params.limit(25, 100);
    match state.store.top_tickers(hours, limit) {
        Ok(tickers) => {
            let count = tickers.len();
            Json(json!({
                "tickers": tickers,
                "hours": hours,
                "count": count,
            }))
        }
        Err(e) => {
            tracing::warn!(error = ?e, "top_tickers query failed");
            Json(json!({ "tickers": [], "hours": hours, "count": 0, "error": "query failed" }))
        }
    }
}

async fn api_ticker_detail(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<WindowParams>,
) -> Json<Value> {
    let hours = params.hours();
    let symbol = symbol.to_uppercase();
    match state.store.ticker_detail(&symbol, hours) {
        Ok(mentions) => {
            let count = mentions.len();
            Json(json!({
                "symbol": symbol,
                "mentions": mentions,
                "hours": hours,
                "count": count,
            }))
        }
        Err(e) => {
            tracing::warn!(error = ?e, %symbol, "ticker_detail query failed");
            Json(json!({ "symbol": symbol, "mentions": [], "hours": hours, "count": 0, "error": "query failed" }))
        }
    }
}

async fn api_options(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Json<Value> {
    let hours = params.hours();
    let limit = params.limit(50, 100);
    let summary = state.store.options_summary(hours);
    let flow = state.store.options_flow(hours, limit);
    match (summary, flow) {
        (Ok(summary), Ok(flow)) => Json(json!({
            "summary": summary,
            "flow": flow,
            "hours": hours,
        })),
        (summary, flow) => {
            if let Err(e) = &summary {
                tracing::warn!(error = ?e, "options_summary query failed");
            }
            if let Err(e) = &flow {
                tracing::warn!(error = ?e, "options_flow query failed");
            }
            Json(json!({ "summary": null, "flow": [], "hours": hours, "error": "query failed" }))
        }
    }
}

async fn api_status(State(state): State<AppState>) -> Json<Value> {
    match state.store.db_stats() {
        Ok(stats) => Json(json!(stats)),
        Err(e) => {
            tracing::warn!(error = ?e, "db_stats query failed");
            Json(json!({ "error": "query failed" }))
        }
    }
}

async fn api_earnings(State(state): State<AppState>, Path(symbol): Path<String>) -> Json<Value> {
    let report = state.oracle.report(&symbol).await;
    Json(json!(report))
}

async fn api_scrape(State(state): State<AppState>) -> Json<Value> {
    match run_pipeline(&state.sources, &state.scorer, &state.vocab, &state.store).await {
        Ok(stats) => Json(json!(stats)),
        Err(e) => {
            tracing::warn!(error = ?e, "manual pipeline run failed");
            Json(json!({ "error": "pipeline failed" }))
        }
    }
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .prometheus
        .as_ref()
        .map(|h| h.render())
        .unwrap_or_default()
}
