//! # Signal Store
//! Append-only event log (mentions + options events) over SQLite, with the
//! windowed aggregation queries that serve the boundary, and the 24h
//! earnings cache. Inserts are idempotent (INSERT OR IGNORE against unique
//! indexes), so repeated or concurrent pipeline runs cannot inflate counts.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::earnings::EARNINGS_CACHE_TTL_SECS;
use crate::ingest::types::SourceType;
use crate::options::OptionCandidate;

/// A ticker needs strictly more than this many in-window mentions to rank.
pub const MIN_MENTIONS_FOR_LEADERBOARD: i64 = 5;

/// Raw mention rows returned per ticker-detail query, newest first.
const TICKER_DETAIL_LIMIT: i64 = 100;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS mentions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    ticker          TEXT NOT NULL,
    source_id       TEXT NOT NULL,
    sentiment_score REAL NOT NULL,
    timestamp       INTEGER NOT NULL,
    source_type     TEXT NOT NULL,
    title           TEXT,
    author          TEXT,
    upvotes         INTEGER NOT NULL DEFAULT 0,
    UNIQUE(ticker, source_id)
);
CREATE INDEX IF NOT EXISTS idx_mentions_ticker ON mentions(ticker);
CREATE INDEX IF NOT EXISTS idx_mentions_timestamp ON mentions(timestamp);
CREATE INDEX IF NOT EXISTS idx_mentions_ticker_timestamp ON mentions(ticker, timestamp);

CREATE TABLE IF NOT EXISTS options_events (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    ticker          TEXT NOT NULL,
    strike          REAL,
    option_type     TEXT,
    expiry_raw      TEXT,
    expiry_category TEXT,
    raw_match       TEXT,
    source_id       TEXT NOT NULL,
    sentiment_score REAL NOT NULL,
    timestamp       INTEGER NOT NULL,
    author          TEXT,
    upvotes         INTEGER NOT NULL DEFAULT 0
);
-- SQLite treats NULLs as distinct inside UNIQUE, so the dedup key coalesces:
-- strike-bearing rows key on (ticker, source, strike, type), keyword-only
-- rows on (ticker, source, expiry_category).
CREATE UNIQUE INDEX IF NOT EXISTS idx_options_dedup ON options_events(
    ticker, source_id, IFNULL(strike, -1.0), IFNULL(option_type, ''), IFNULL(expiry_category, '')
);
CREATE INDEX IF NOT EXISTS idx_options_ticker ON options_events(ticker);
CREATE INDEX IF NOT EXISTS idx_options_timestamp ON options_events(timestamp);

CREATE TABLE IF NOT EXISTS earnings_cache (
    ticker      TEXT PRIMARY KEY,
    data        TEXT NOT NULL,
    fetched_at  INTEGER NOT NULL
);
"#;

/// One mention row to be appended to the log.
#[derive(Debug, Clone)]
pub struct MentionRow {
    pub ticker: String,
    pub source_id: String,
    pub sentiment_score: f64,
    pub timestamp: i64,
    pub source_type: SourceType,
    pub title_snippet: String,
    pub author: String,
    pub upvotes: i64,
}

/// One options event row to be appended to the log.
#[derive(Debug, Clone)]
pub struct OptionEventRow {
    pub candidate: OptionCandidate,
    pub source_id: String,
    pub sentiment_score: f64,
    pub timestamp: i64,
    pub author: String,
    pub upvotes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickerStat {
    pub ticker: String,
    pub mention_count: i64,
    pub avg_sentiment: f64,
    pub unique_authors: i64,
    pub top_upvotes: i64,
    pub latest_mention: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MentionRecord {
    pub ticker: String,
    pub source_id: String,
    pub sentiment_score: f64,
    pub timestamp: i64,
    pub source_type: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub upvotes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionHighlight {
    pub ticker: String,
    pub strike: Option<f64>,
    pub expiry_raw: Option<String>,
    pub expiry_category: Option<String>,
    pub raw_match: Option<String>,
    pub upvotes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionsSummary {
    pub total: i64,
    pub calls: i64,
    pub puts: i64,
    pub call_put_ratio: f64,
    pub top_calls: Vec<OptionHighlight>,
    pub top_puts: Vec<OptionHighlight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionsFlowRow {
    pub ticker: String,
    pub option_type: String,
    pub count: i64,
    pub min_strike: Option<f64>,
    pub avg_strike: Option<f64>,
    pub max_strike: Option<f64>,
    pub avg_sentiment: f64,
    pub unique_authors: i64,
    pub expiry_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub total_mentions: i64,
    pub unique_tickers: i64,
    pub latest_timestamp: Option<i64>,
}

/// Thread-safe handle over the SQLite event log.
pub struct SignalStore {
    conn: Mutex<Connection>,
}

impl SignalStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating db directory {}", dir.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("enabling WAL")?;
        Self::from_connection(conn)
    }

    /// Ephemeral store for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory().context("opening in-memory db")?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).context("applying schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append mention rows; duplicates are silently ignored. Returns the
    /// number of rows actually inserted.
    pub fn insert_mentions(&self, rows: &[MentionRow]) -> Result<usize> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO mentions
                 (ticker, source_id, sentiment_score, timestamp, source_type, title, author, upvotes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for r in rows {
                inserted += stmt.execute(params![
                    r.ticker,
                    r.source_id,
                    r.sentiment_score,
                    r.timestamp,
                    r.source_type.as_str(),
                    r.title_snippet,
                    r.author,
                    r.upvotes,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Append options event rows; duplicates are silently ignored. Returns
    /// the number of rows actually inserted.
    pub fn insert_options(&self, rows: &[OptionEventRow]) -> Result<usize> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO options_events
                 (ticker, strike, option_type, expiry_raw, expiry_category, raw_match,
                  source_id, sentiment_score, timestamp, author, upvotes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for r in rows {
                let c = &r.candidate;
                inserted += stmt.execute(params![
                    c.ticker,
                    c.strike,
                    c.option_type.map(|t| t.as_str()),
                    c.expiry_raw,
                    c.expiry_category.map(|e| e.as_str()),
                    c.raw_match,
                    r.source_id,
                    r.sentiment_score,
                    r.timestamp,
                    r.author,
                    r.upvotes,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Ranked in-window tickers, most mentioned first. Requires strictly
    /// more than [`MIN_MENTIONS_FOR_LEADERBOARD`] mentions.
    pub fn top_tickers(&self, window_hours: u64, limit: u32) -> Result<Vec<TickerStat>> {
        self.top_tickers_at(now_unix(), window_hours, limit)
    }

    pub fn top_tickers_at(&self, now: i64, window_hours: u64, limit: u32) -> Result<Vec<TickerStat>> {
        let (cutoff, now) = window_bounds(now, window_hours);
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT
                 ticker,
                 COUNT(*) AS mention_count,
                 ROUND(AVG(sentiment_score), 4) AS avg_sentiment,
                 COUNT(DISTINCT author) AS unique_authors,
                 MAX(upvotes) AS top_upvotes,
                 MAX(timestamp) AS latest_mention
             FROM mentions
             WHERE timestamp >= ?1 AND timestamp < ?2
             GROUP BY ticker
             HAVING COUNT(*) > ?3
             ORDER BY mention_count DESC
             LIMIT ?4",
        )?;
        let rows = stmt
            .query_map(
                params![cutoff, now, MIN_MENTIONS_FOR_LEADERBOARD, limit],
                |row| {
                    Ok(TickerStat {
                        ticker: row.get(0)?,
                        mention_count: row.get(1)?,
                        avg_sentiment: row.get(2)?,
                        unique_authors: row.get(3)?,
                        top_upvotes: row.get(4)?,
                        latest_mention: row.get(5)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Up to 100 most-recent raw mentions for one ticker, newest first.
    pub fn ticker_detail(&self, ticker: &str, window_hours: u64) -> Result<Vec<MentionRecord>> {
        self.ticker_detail_at(now_unix(), ticker, window_hours)
    }

    pub fn ticker_detail_at(
        &self,
        now: i64,
        ticker: &str,
        window_hours: u64,
    ) -> Result<Vec<MentionRecord>> {
        let (cutoff, now) = window_bounds(now, window_hours);
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT ticker, source_id, sentiment_score, timestamp, source_type, title, author, upvotes
             FROM mentions
             WHERE ticker = ?1 AND timestamp >= ?2 AND timestamp < ?3
             ORDER BY timestamp DESC
             LIMIT ?4",
        )?;
        let rows = stmt
            .query_map(
                params![ticker.to_uppercase(), cutoff, now, TICKER_DETAIL_LIMIT],
                |row| {
                    Ok(MentionRecord {
                        ticker: row.get(0)?,
                        source_id: row.get(1)?,
                        sentiment_score: row.get(2)?,
                        timestamp: row.get(3)?,
                        source_type: row.get(4)?,
                        title: row.get(5)?,
                        author: row.get(6)?,
                        upvotes: row.get(7)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// High-level in-window options stats: totals, call/put ratio (puts
    /// floored at 1), and the five most-upvoted plays per side.
    pub fn options_summary(&self, window_hours: u64) -> Result<OptionsSummary> {
        self.options_summary_at(now_unix(), window_hours)
    }

    pub fn options_summary_at(&self, now: i64, window_hours: u64) -> Result<OptionsSummary> {
        let (cutoff, now) = window_bounds(now, window_hours);
        let conn = self.conn.lock().expect("store mutex poisoned");

        let count_where = |type_filter: Option<&str>| -> Result<i64> {
            let n = match type_filter {
                None => conn.query_row(
                    "SELECT COUNT(*) FROM options_events WHERE timestamp >= ?1 AND timestamp < ?2",
                    params![cutoff, now],
                    |row| row.get(0),
                )?,
                Some(t) => conn.query_row(
                    "SELECT COUNT(*) FROM options_events
                     WHERE timestamp >= ?1 AND timestamp < ?2 AND option_type = ?3",
                    params![cutoff, now, t],
                    |row| row.get(0),
                )?,
            };
            Ok(n)
        };

        let total = count_where(None)?;
        let calls = count_where(Some("call"))?;
        let puts = count_where(Some("put"))?;

        let top_side = |side: &str| -> Result<Vec<OptionHighlight>> {
            let mut stmt = conn.prepare(
                "SELECT ticker, strike, expiry_raw, expiry_category, raw_match, upvotes
                 FROM options_events
                 WHERE timestamp >= ?1 AND timestamp < ?2 AND option_type = ?3
                 ORDER BY upvotes DESC
                 LIMIT 5",
            )?;
            let rows = stmt
                .query_map(params![cutoff, now, side], |row| {
                    Ok(OptionHighlight {
                        ticker: row.get(0)?,
                        strike: row.get(1)?,
                        expiry_raw: row.get(2)?,
                        expiry_category: row.get(3)?,
                        raw_match: row.get(4)?,
                        upvotes: row.get(5)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        };

        let ratio = calls as f64 / puts.max(1) as f64;
        Ok(OptionsSummary {
            total,
            calls,
            puts,
            call_put_ratio: (ratio * 100.0).round() / 100.0,
            top_calls: top_side("call")?,
            top_puts: top_side("put")?,
        })
    }

    /// In-window options flow grouped by (ticker, option_type), most
    /// frequent first, with strike spread and observed expiry categories.
    pub fn options_flow(&self, window_hours: u64, limit: u32) -> Result<Vec<OptionsFlowRow>> {
        self.options_flow_at(now_unix(), window_hours, limit)
    }

    pub fn options_flow_at(
        &self,
        now: i64,
        window_hours: u64,
        limit: u32,
    ) -> Result<Vec<OptionsFlowRow>> {
        let (cutoff, now) = window_bounds(now, window_hours);
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT
                 ticker,
                 option_type,
                 COUNT(*) AS cnt,
                 MIN(strike),
                 ROUND(AVG(strike), 2),
                 MAX(strike),
                 ROUND(AVG(sentiment_score), 4),
                 COUNT(DISTINCT author),
                 GROUP_CONCAT(DISTINCT expiry_category)
             FROM options_events
             WHERE timestamp >= ?1 AND timestamp < ?2 AND option_type IS NOT NULL
             GROUP BY ticker, option_type
             ORDER BY cnt DESC
             LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(params![cutoff, now, limit], |row| {
                let concat: Option<String> = row.get(8)?;
                Ok(OptionsFlowRow {
                    ticker: row.get(0)?,
                    option_type: row.get(1)?,
                    count: row.get(2)?,
                    min_strike: row.get(3)?,
                    avg_strike: row.get(4)?,
                    max_strike: row.get(5)?,
                    avg_sentiment: row.get(6)?,
                    unique_authors: row.get(7)?,
                    expiry_categories: concat
                        .map(|s| s.split(',').map(str::to_string).collect())
                        .unwrap_or_default(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn db_stats(&self) -> Result<DbStats> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let total_mentions =
            conn.query_row("SELECT COUNT(*) FROM mentions", [], |row| row.get(0))?;
        let unique_tickers = conn.query_row(
            "SELECT COUNT(DISTINCT ticker) FROM mentions",
            [],
            |row| row.get(0),
        )?;
        let latest_timestamp =
            conn.query_row("SELECT MAX(timestamp) FROM mentions", [], |row| row.get(0))?;
        Ok(DbStats {
            total_mentions,
            unique_tickers,
            latest_timestamp,
        })
    }

    /// Cached earnings blob, only while fresh (age strictly under 24h).
    /// Stale entries read as absent.
    pub fn earnings_cache_get(&self, ticker: &str, now: i64) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT data, fetched_at FROM earnings_cache WHERE ticker = ?1",
                params![ticker.to_uppercase()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.and_then(|(data, fetched_at)| {
            if now - fetched_at < EARNINGS_CACHE_TTL_SECS {
                Some(data)
            } else {
                None
            }
        }))
    }

    /// Upsert an earnings cache entry (recomputation overwrites).
    pub fn earnings_cache_put(&self, ticker: &str, data: &str, now: i64) -> Result<()> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute(
            "INSERT INTO earnings_cache (ticker, data, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(ticker) DO UPDATE SET data = excluded.data, fetched_at = excluded.fetched_at",
            params![ticker.to_uppercase(), data, now],
        )?;
        Ok(())
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Half-open interval [now - window, now) in whole seconds.
fn window_bounds(now: i64, window_hours: u64) -> (i64, i64) {
    (now - (window_hours as i64) * 3600, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ExpiryCategory, OptionType};

    fn mention(ticker: &str, source_id: &str, ts: i64, author: &str, upvotes: i64) -> MentionRow {
        MentionRow {
            ticker: ticker.into(),
            source_id: source_id.into(),
            sentiment_score: 0.5,
            timestamp: ts,
            source_type: SourceType::Post,
            title_snippet: "title".into(),
            author: author.into(),
            upvotes,
        }
    }

    fn option_event(
        ticker: &str,
        strike: Option<f64>,
        option_type: Option<OptionType>,
        category: Option<ExpiryCategory>,
        source_id: &str,
        ts: i64,
        upvotes: i64,
    ) -> OptionEventRow {
        OptionEventRow {
            candidate: OptionCandidate {
                ticker: ticker.into(),
                strike,
                option_type,
                expiry_raw: None,
                expiry_category: category,
                raw_match: "raw".into(),
            },
            source_id: source_id.into(),
            sentiment_score: 0.1,
            timestamp: ts,
            author: "author".into(),
            upvotes,
        }
    }

    #[test]
    fn duplicate_mentions_count_once() {
        let store = SignalStore::open_in_memory().unwrap();
        let row = mention("GME", "p1", 1_000, "ape", 10);
        assert_eq!(store.insert_mentions(&[row.clone()]).unwrap(), 1);
        assert_eq!(store.insert_mentions(&[row]).unwrap(), 0);
        assert_eq!(store.db_stats().unwrap().total_mentions, 1);
    }

    #[test]
    fn top_tickers_requires_strictly_more_than_five() {
        let store = SignalStore::open_in_memory().unwrap();
        let now = 1_000_000;
        // X: exactly 5 mentions; Y: 6 mentions
        for i in 0..5 {
            store
                .insert_mentions(&[mention("XXX", &format!("x{i}"), now - 100, "a", 1)])
                .unwrap();
        }
        for i in 0..6 {
            store
                .insert_mentions(&[mention("YYY", &format!("y{i}"), now - 100, "a", 1)])
                .unwrap();
        }
        let top = store.top_tickers_at(now, 24, 25).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].ticker, "YYY");
        assert_eq!(top[0].mention_count, 6);
    }

    #[test]
    fn windows_are_half_open() {
        let store = SignalStore::open_in_memory().unwrap();
        let now = 1_000_000;
        let window_start = now - 24 * 3600;
        for (i, ts) in [window_start - 1, window_start, now - 1, now]
            .into_iter()
            .enumerate()
        {
            store
                .insert_mentions(&[mention("GME", &format!("p{i}"), ts, "a", 1)])
                .unwrap();
        }
        let detail = store.ticker_detail_at(now, "GME", 24).unwrap();
        // ts == window_start is included; ts == now and ts < start are not
        let stamps: Vec<i64> = detail.iter().map(|m| m.timestamp).collect();
        assert_eq!(stamps, vec![now - 1, window_start]);
    }

    #[test]
    fn ticker_detail_is_newest_first_and_case_insensitive() {
        let store = SignalStore::open_in_memory().unwrap();
        let now = 1_000_000;
        store
            .insert_mentions(&[
                mention("GME", "old", now - 300, "a", 1),
                mention("GME", "new", now - 10, "b", 2),
            ])
            .unwrap();
        let detail = store.ticker_detail_at(now, "gme", 24).unwrap();
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0].source_id, "new");
    }

    #[test]
    fn keyword_only_option_rows_are_idempotent_too() {
        let store = SignalStore::open_in_memory().unwrap();
        let row = option_event(
            "SPX",
            None,
            None,
            Some(ExpiryCategory::ZeroDte),
            "p1",
            1_000,
            3,
        );
        assert_eq!(store.insert_options(&[row.clone()]).unwrap(), 1);
        assert_eq!(store.insert_options(&[row]).unwrap(), 0);
    }

    #[test]
    fn keyword_only_and_strike_rows_do_not_collide() {
        let store = SignalStore::open_in_memory().unwrap();
        let keyword = option_event(
            "SPY",
            None,
            None,
            Some(ExpiryCategory::Weekly),
            "p1",
            1_000,
            0,
        );
        let strike = option_event(
            "SPY",
            Some(680.0),
            Some(OptionType::Put),
            Some(ExpiryCategory::Weekly),
            "p1",
            1_000,
            0,
        );
        assert_eq!(store.insert_options(&[keyword, strike]).unwrap(), 2);
    }

    #[test]
    fn options_summary_floors_puts_at_one() {
        let store = SignalStore::open_in_memory().unwrap();
        let now = 1_000_000;
        store
            .insert_options(&[
                option_event("GME", Some(30.0), Some(OptionType::Call), None, "p1", now - 5, 9),
                option_event("GME", Some(35.0), Some(OptionType::Call), None, "p2", now - 5, 4),
            ])
            .unwrap();
        let summary = store.options_summary_at(now, 24).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.calls, 2);
        assert_eq!(summary.puts, 0);
        assert_eq!(summary.call_put_ratio, 2.0);
        assert_eq!(summary.top_calls.len(), 2);
        assert_eq!(summary.top_calls[0].upvotes, 9);
        assert!(summary.top_puts.is_empty());
    }

    #[test]
    fn options_flow_groups_by_ticker_and_type() {
        let store = SignalStore::open_in_memory().unwrap();
        let now = 1_000_000;
        store
            .insert_options(&[
                option_event("NVDA", Some(200.0), Some(OptionType::Call), Some(ExpiryCategory::Dated), "p1", now - 5, 1),
                option_event("NVDA", Some(220.0), Some(OptionType::Call), Some(ExpiryCategory::Weekly), "p2", now - 5, 1),
                option_event("NVDA", Some(180.0), Some(OptionType::Put), None, "p3", now - 5, 1),
                // keyword-only rows are excluded from the flow grouping
                option_event("NVDA", None, None, Some(ExpiryCategory::ZeroDte), "p4", now - 5, 1),
            ])
            .unwrap();
        let flow = store.options_flow_at(now, 24, 50).unwrap();
        assert_eq!(flow.len(), 2);
        let calls = flow.iter().find(|r| r.option_type == "call").unwrap();
        assert_eq!(calls.count, 2);
        assert_eq!(calls.min_strike, Some(200.0));
        assert_eq!(calls.max_strike, Some(220.0));
        assert_eq!(calls.avg_strike, Some(210.0));
        let mut cats = calls.expiry_categories.clone();
        cats.sort();
        assert_eq!(cats, vec!["dated", "weekly"]);
    }

    #[test]
    fn earnings_cache_freshness_boundary() {
        let store = SignalStore::open_in_memory().unwrap();
        let fetched_at = 1_000_000;
        store.earnings_cache_put("AAPL", "{}", fetched_at).unwrap();

        // 23h59m later: served
        let now = fetched_at + 24 * 3600 - 60;
        assert!(store.earnings_cache_get("AAPL", now).unwrap().is_some());

        // 24h1m later: logically absent
        let now = fetched_at + 24 * 3600 + 60;
        assert!(store.earnings_cache_get("AAPL", now).unwrap().is_none());
    }

    #[test]
    fn earnings_cache_recompute_overwrites() {
        let store = SignalStore::open_in_memory().unwrap();
        store.earnings_cache_put("AAPL", "old", 1_000).unwrap();
        store.earnings_cache_put("AAPL", "new", 2_000).unwrap();
        assert_eq!(
            store.earnings_cache_get("AAPL", 2_500).unwrap().as_deref(),
            Some("new")
        );
    }
}
