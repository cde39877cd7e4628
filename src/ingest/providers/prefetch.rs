//! File-backed market data: a committed JSON file of per-symbol earnings
//! samples, served without any network dependency. The file is a map of
//! `SYMBOL -> [{date, price_before, price_after, ...}]`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::ingest::types::{EarningsSample, MarketData};

pub struct PrefetchMarketData {
    samples: HashMap<String, Vec<EarningsSample>>,
}

impl PrefetchMarketData {
    /// Load the prefetch file. A missing file yields an empty provider (every
    /// lookup reports "no data") rather than an error.
    pub fn from_path(path: &Path) -> Self {
        match Self::try_from_path(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = ?e, path = %path.display(), "earnings prefetch unavailable");
                Self {
                    samples: HashMap::new(),
                }
            }
        }
    }

    pub fn try_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading earnings prefetch at {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, Vec<EarningsSample>> =
            serde_json::from_str(raw).context("parsing earnings prefetch")?;
        let samples = parsed
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        Ok(Self { samples })
    }

    /// Test/in-process constructor.
    pub fn from_map(samples: HashMap<String, Vec<EarningsSample>>) -> Self {
        Self { samples }
    }
}

#[async_trait]
impl MarketData for PrefetchMarketData {
    async fn earnings_history(&self, symbol: &str) -> Result<Vec<EarningsSample>> {
        self.samples
            .get(&symbol.to_uppercase())
            .cloned()
            .ok_or_else(|| anyhow!("no earnings data for {symbol}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "aapl": [
            {"date": "2024-01-25", "price_before": 194.5, "price_after": 191.2},
            {"date": "2024-05-02", "price_before": 169.3, "price_after": 183.4, "eps_estimate": 1.5, "eps_actual": 1.53}
        ]
    }"#;

    #[tokio::test]
    async fn lookups_are_case_insensitive() {
        let p = PrefetchMarketData::from_json(FIXTURE).unwrap();
        let samples = p.earnings_history("AAPL").await.unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].eps_actual, Some(1.53));
    }

    #[tokio::test]
    async fn unknown_symbol_is_an_explicit_error() {
        let p = PrefetchMarketData::from_json(FIXTURE).unwrap();
        assert!(p.earnings_history("ZZZZ").await.is_err());
    }
}
