// src/config.rs
//! Runtime configuration from environment variables (loaded through
//! `dotenvy` in the binary). Every knob has a compiled-in default.

use std::path::PathBuf;

pub const ENV_BIND_ADDR: &str = "TRACKER_BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

pub const ENV_DB_PATH: &str = "TRACKER_DB_PATH";
pub const DEFAULT_DB_PATH: &str = "data/wsb.db";

pub const ENV_SEC_CACHE_PATH: &str = "TRACKER_SEC_CACHE_PATH";
pub const DEFAULT_SEC_CACHE_PATH: &str = "data/sec_tickers.json";

pub const ENV_EARNINGS_PREFETCH_PATH: &str = "TRACKER_EARNINGS_PREFETCH_PATH";
pub const DEFAULT_EARNINGS_PREFETCH_PATH: &str = "data/earnings_prefetch.json";

pub const ENV_SUBREDDIT_URL: &str = "TRACKER_SUBREDDIT_URL";

/// Seconds between scheduled pipeline runs; 0 disables the scheduler.
pub const ENV_SCRAPE_INTERVAL_SECS: &str = "TRACKER_SCRAPE_INTERVAL_SECS";
pub const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 900;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub sec_cache_path: PathBuf,
    pub earnings_prefetch_path: PathBuf,
    pub subreddit_url: String,
    pub scrape_interval_secs: u64,
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or(ENV_BIND_ADDR, DEFAULT_BIND_ADDR),
            db_path: PathBuf::from(env_or(ENV_DB_PATH, DEFAULT_DB_PATH)),
            sec_cache_path: PathBuf::from(env_or(ENV_SEC_CACHE_PATH, DEFAULT_SEC_CACHE_PATH)),
            earnings_prefetch_path: PathBuf::from(env_or(
                ENV_EARNINGS_PREFETCH_PATH,
                DEFAULT_EARNINGS_PREFETCH_PATH,
            )),
            subreddit_url: env_or(
                ENV_SUBREDDIT_URL,
                crate::ingest::providers::reddit::DEFAULT_SUBREDDIT_URL,
            ),
            scrape_interval_secs: std::env::var(ENV_SCRAPE_INTERVAL_SECS)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_SCRAPE_INTERVAL_SECS),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn defaults_apply_without_env() {
        std::env::remove_var(ENV_BIND_ADDR);
        std::env::remove_var(ENV_SCRAPE_INTERVAL_SECS);
        let cfg = TrackerConfig::from_env();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(cfg.scrape_interval_secs, DEFAULT_SCRAPE_INTERVAL_SECS);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_and_garbage_falls_back() {
        std::env::set_var(ENV_BIND_ADDR, "127.0.0.1:9999");
        std::env::set_var(ENV_SCRAPE_INTERVAL_SECS, "not-a-number");
        let cfg = TrackerConfig::from_env();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9999");
        assert_eq!(cfg.scrape_interval_secs, DEFAULT_SCRAPE_INTERVAL_SECS);
        std::env::remove_var(ENV_BIND_ADDR);
        std::env::remove_var(ENV_SCRAPE_INTERVAL_SECS);
    }
}
