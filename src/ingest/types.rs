// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Where a text unit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Post,
    Comment,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Post => "post",
            SourceType::Comment => "comment",
        }
    }
}

/// One fetched unit of forum text. Immutable once fetched; identity is `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextUnit {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub upvotes: i64,
    pub created_at: i64, // unix seconds
    pub source_type: SourceType,
}

/// Upstream collaborator: yields a finite batch of text units.
/// May return an empty batch; each id appears at most once per batch.
#[async_trait::async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<TextUnit>>;
    fn name(&self) -> &'static str;
}

/// One historical earnings event with closing prices around the announcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarningsSample {
    pub date: String, // YYYY-MM-DD
    pub price_before: f64,
    pub price_after: f64,
    #[serde(default)]
    pub eps_estimate: Option<f64>,
    #[serde(default)]
    pub eps_actual: Option<f64>,
}

/// Downstream collaborator: historical earnings samples keyed by ticker.
/// Empty result and explicit error are both "cannot classify" to callers.
#[async_trait::async_trait]
pub trait MarketData: Send + Sync {
    async fn earnings_history(&self, symbol: &str) -> Result<Vec<EarningsSample>>;
}
