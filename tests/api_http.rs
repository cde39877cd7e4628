// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /api/scrape + GET /api/status (pipeline through the boundary)
// - GET /api/tickers (shape contract)
// - GET /api/ticker/{symbol}
// - GET /api/options
// - GET /api/earnings/{symbol} (cached flag flips)

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use wsb_sentiment_tracker::api::{self, AppState};
use wsb_sentiment_tracker::earnings::EarningsOracle;
use wsb_sentiment_tracker::ingest::providers::prefetch::PrefetchMarketData;
use wsb_sentiment_tracker::ingest::types::{
    EarningsSample, SourceType, TextSource, TextUnit,
};
use wsb_sentiment_tracker::sentiment::SentimentScorer;
use wsb_sentiment_tracker::store::SignalStore;
use wsb_sentiment_tracker::vocab::Vocabulary;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

struct ScriptedSource;

#[async_trait::async_trait]
impl TextSource for ScriptedSource {
    async fn fetch_latest(&self) -> Result<Vec<TextUnit>> {
        let now = chrono::Utc::now().timestamp();
        Ok(vec![
            TextUnit {
                id: "p1".into(),
                title: "GME yolo update".into(),
                body: "$GME 30 calls friday \u{1F680}".into(),
                author: "ape1".into(),
                upvotes: 120,
                created_at: now - 60,
                source_type: SourceType::Post,
            },
            TextUnit {
                id: "c1".into(),
                title: "SPY 680p 0DTE, see you at the wendys dumpster".into(),
                body: String::new(),
                author: "ape2".into(),
                upvotes: 15,
                created_at: now - 30,
                source_type: SourceType::Comment,
            },
        ])
    }
    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Build the same Router the binary uses, over in-memory state.
fn test_router() -> Router {
    let store = Arc::new(SignalStore::open_in_memory().expect("in-memory store"));
    let mut earnings = HashMap::new();
    earnings.insert(
        "GME".to_string(),
        vec![EarningsSample {
            date: "2024-03-26".into(),
            price_before: 15.4,
            price_after: 12.9,
            eps_estimate: None,
            eps_actual: None,
        }],
    );
    let market = Arc::new(PrefetchMarketData::from_map(earnings));
    let oracle = Arc::new(EarningsOracle::new(market, store.clone()));
    let sources: Arc<Vec<Box<dyn TextSource>>> = Arc::new(vec![Box::new(ScriptedSource)]);

    let state = AppState {
        store,
        scorer: Arc::new(SentimentScorer::new()),
        vocab: Arc::new(Vocabulary::from_symbols(&["GME", "SPY"])),
        sources,
        oracle,
        prometheus: None,
    };
    api::router(state)
}

async fn get_json(app: &Router, uri: &str) -> Json {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET request");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    assert!(resp.status().is_success(), "GET {uri} -> {}", resp.status());
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

async fn post_json(app: &Router, uri: &str) -> Json {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("build POST request");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    assert!(resp.status().is_success(), "POST {uri} -> {}", resp.status());
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn scrape_then_status_reflects_inserted_rows() {
    let app = test_router();

    let stats = post_json(&app, "/api/scrape").await;
    assert_eq!(stats["posts_fetched"], 1);
    assert_eq!(stats["comments_fetched"], 1);
    assert_eq!(stats["mentions_inserted"], 2); // GME (post), SPY (comment)
    assert_eq!(stats["options_inserted"], 2); // GME 30c, SPY 680p

    let status = get_json(&app, "/api/status").await;
    assert_eq!(status["total_mentions"], 2);
    assert_eq!(status["unique_tickers"], 2);

    // Re-scrape through the boundary: still well-formed, nothing new
    let again = post_json(&app, "/api/scrape").await;
    assert_eq!(again["mentions_inserted"], 0);
    assert_eq!(again["options_inserted"], 0);
}

#[tokio::test]
async fn tickers_response_has_the_contract_shape() {
    let app = test_router();
    let v = get_json(&app, "/api/tickers?hours=48&limit=10").await;
    assert!(v.get("tickers").is_some(), "missing 'tickers'");
    assert_eq!(v["hours"], 48);
    assert!(v.get("count").is_some(), "missing 'count'");
    // Below the >5 mention floor, the board is empty but well-formed
    assert_eq!(v["count"], 0);
}

#[tokio::test]
async fn ticker_detail_returns_rows_after_scrape() {
    let app = test_router();
    post_json(&app, "/api/scrape").await;

    let v = get_json(&app, "/api/ticker/gme").await;
    assert_eq!(v["symbol"], "GME");
    assert_eq!(v["count"], 1);
    let mention = &v["mentions"][0];
    assert_eq!(mention["ticker"], "GME");
    assert_eq!(mention["source_type"], "post");
}

#[tokio::test]
async fn options_endpoint_returns_summary_and_flow() {
    let app = test_router();
    post_json(&app, "/api/scrape").await;

    let v = get_json(&app, "/api/options").await;
    assert_eq!(v["summary"]["calls"], 1);
    assert_eq!(v["summary"]["puts"], 1);
    assert_eq!(v["summary"]["call_put_ratio"], 1.0);
    let flow = v["flow"].as_array().expect("flow array");
    assert_eq!(flow.len(), 2);
}

#[tokio::test]
async fn earnings_endpoint_flips_the_cached_flag() {
    let app = test_router();

    let first = get_json(&app, "/api/earnings/gme").await;
    assert_eq!(first["symbol"], "GME");
    assert_eq!(first["cached"], false);
    assert_eq!(first["events"], 1);
    assert_eq!(first["history"][0]["classification"], "TANK");

    let second = get_json(&app, "/api/earnings/GME").await;
    assert_eq!(second["cached"], true);

    let missing = get_json(&app, "/api/earnings/ZZZZ").await;
    assert!(missing["error"].is_string(), "unknown symbol reports error");
}
