//! # Ticker Vocabulary
//! Compiled-in blocklist of words and acronyms that collide with ticker
//! syntax, a small allowlist of non-listed index/volatility symbols, and the
//! authoritative SEC ticker set (fetched once, cached to disk).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

/// SEC EDGAR company ticker listing.
pub const SEC_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Index/volatility symbols that are commonly traded as options but never
/// appear in the SEC company listing.
pub const INDEX_TICKERS: &[&str] = &["SPX", "VIX", "NDX", "RUT", "DXY"];

/// WSB slang, common English words, and abbreviations that match ticker
/// syntax. Applied only on the low-confidence (bare uppercase) path; an
/// explicit `$` prefix is treated as deliberate.
static BLOCKLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    BLOCKLIST_WORDS.iter().copied().collect()
});

#[rustfmt::skip]
const BLOCKLIST_WORDS: &[&str] = &[
    // WSB slang
    "AI", "DD", "YOLO", "HODL", "FOMO", "FD", "TLDR", "IMO", "IMHO", "WSB",
    "MOASS", "APE", "APES", "ROPE", "GUH", "BULL", "BEAR", "DIP", "DIPS",
    "ATH", "ATL", "OTM", "ITM", "DTM", "IV", "DTE", "LEAP", "LEAPS",
    "PT", "TP", "SL", "EOD", "EOW", "EOM", "EOY", "YTD", "QE", "GDP",
    "CPI", "PPI", "NFP", "FOMC", "IPO", "SEC", "ETF", "ETN", "CEO",
    "CFO", "COO", "CTO", "CMO", "CIO", "VP", "SVP", "EVP", "BOD",
    // Common words that match ticker patterns
    "ALL", "ARE", "AND", "ANY", "BIG", "BIT", "BUT", "BUY", "CAN", "CAR",
    "DAY", "DID", "DO", "EAR", "EAT", "END", "ERA", "FAT", "FAN", "FAR",
    "FED", "FEW", "FOR", "FUN", "GAP", "GET", "GOD", "GOT", "GAS", "HAS",
    "HAD", "HIT", "HOT", "HOW", "ICE", "ILL", "ITS", "JOB", "KEY", "LET",
    "LOT", "LOW", "MAN", "MAP", "MAY", "MEN", "MET", "MOM", "NET", "NEW",
    "NOT", "NOW", "NUT", "ODD", "OFF", "OLD", "ONE", "OUR", "OUT", "OWN",
    "PAY", "PER", "PIT", "PLZ", "POP", "PUT", "RAN", "RAW", "RED", "RIP",
    "RUN", "SAD", "SAT", "SAW", "SAY", "SET", "SHE", "SIT", "SIX", "SKY",
    "SOS", "SUN", "TAN", "TAX", "THE", "TIP", "TOP", "TOO", "TWO", "USE",
    "VAN", "WAR", "WAY", "WAS", "WHO", "WHY", "WIN", "WON", "YES", "YET",
    "YOU", "ZIP",
    // Longer common words
    "ALSO", "BACK", "BEEN", "BEST", "CALL", "CASH", "COME", "CORE", "COST",
    "DATA", "DEAL", "DEEP", "DOWN", "EACH", "EASY", "EDIT", "EVEN", "EVER",
    "FACE", "FACT", "FAST", "FEEL", "FILL", "FIND", "FIRE", "FLAT", "FLIP",
    "FLOW", "FOOD", "FREE", "FROM", "FULL", "FUND", "GAIN", "GAME", "GAVE",
    "GLAD", "GOES", "GOLD", "GONE", "GOOD", "GRAB", "GREW", "GROW", "HALF",
    "HAND", "HANG", "HARD", "HATE", "HAVE", "HEAD", "HEAR", "HELD", "HELP",
    "HERE", "HIGH", "HOLD", "HOME", "HOPE", "HUGE", "IDEA", "INTO", "JUST",
    "KEEP", "KILL", "KIND", "KNEW", "KNOW", "LACK", "LAND", "LAST", "LATE",
    "LEAD", "LEFT", "LEND", "LESS", "LIFE", "LIKE", "LINE", "LINK", "LIVE",
    "LONG", "LOOK", "LOSE", "LOSS", "LOST", "LOVE", "LUCK", "MADE", "MAIN",
    "MAKE", "MANY", "MARK", "MEAN", "MINE", "MISS", "MODE", "MORE", "MOON",
    "MOST", "MOVE", "MUCH", "MUST", "NEAR", "NEED", "NEXT", "NICE", "NONE",
    "NORM", "NOTE", "ONLY", "OPEN", "ONCE", "OVER", "PAGE", "PAID", "PART",
    "PASS", "PAST", "PATH", "PICK", "PLAN", "PLAY", "PLUS", "POLL", "POOR",
    "POST", "PULL", "PUMP", "PURE", "PUSH", "PUTS", "RATE", "READ", "REAL",
    "RENT", "REST", "RICH", "RIDE", "RISE", "RISK", "ROAD", "ROCK", "ROLL",
    "RULE", "RUNS", "RUSH", "SAFE", "SAID", "SALE", "SAME", "SAVE", "SELL",
    "SEND", "SHOP", "SHOT", "SHOW", "SHUT", "SIDE", "SIGN", "SIZE", "SLOW",
    "SOLD", "SOME", "SOON", "SORT", "STAY", "STEP", "STOP", "SURE", "SWAP",
    "TAKE", "TALK", "TANK", "TEAM", "TELL", "TEST", "THAN", "THAT", "THEM",
    "THEN", "THEY", "THIS", "TICK", "TIME", "TOLD", "TOOK", "TOPS", "TURN",
    "TYPE", "UNIT", "UPON", "USED", "VERY", "VOTE", "WAIT", "WAKE", "WALK",
    "WALL", "WANT", "WEAK", "WEEK", "WELL", "WENT", "WERE", "WHAT", "WHEN",
    "WHOM", "WIDE", "WILL", "WISH", "WITH", "WORD", "WORK", "YEAR", "YOUR",
    "ZERO",
    // Reddit/internet slang
    "LMAO", "LMFAO", "STFU", "GTFO", "IDGAF", "ROFL",
    "NSFW", "IIRC", "TIL", "ELI5", "AFAIK",
    // Financial terms
    "SHORT", "DUMP", "BOND", "DEBT", "LOAN", "FEES", "SPEND",
];

/// Is the word on the compiled-in blocklist?
pub fn is_blocklisted(word: &str) -> bool {
    BLOCKLIST.contains(word)
}

#[derive(Debug, Deserialize)]
struct SecRow {
    ticker: String,
}

/// Validated ticker vocabulary: the authoritative exchange listing, when
/// available. An empty authoritative set degrades filtering to
/// blocklist-only (reduced precision, never an error).
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    authoritative: HashSet<String>,
}

impl Vocabulary {
    /// No authoritative list; blocklist-only filtering.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_set(authoritative: HashSet<String>) -> Self {
        Self { authoritative }
    }

    /// Convenience for tests: build from a symbol slice.
    pub fn from_symbols(symbols: &[&str]) -> Self {
        Self::from_set(symbols.iter().map(|s| s.to_uppercase()).collect())
    }

    /// Load the authoritative set: local cache first, SEC EDGAR otherwise.
    /// Never fails; fetch or parse errors degrade to an empty vocabulary.
    pub async fn load(cache_path: &Path) -> Self {
        match load_or_fetch(cache_path).await {
            Ok(set) => {
                tracing::info!(tickers = set.len(), "authoritative ticker list ready");
                Self::from_set(set)
            }
            Err(e) => {
                tracing::warn!(error = ?e, "could not load SEC tickers; degrading to blocklist-only");
                Self::empty()
            }
        }
    }

    pub fn has_authoritative(&self) -> bool {
        !self.authoritative.is_empty()
    }

    pub fn is_listed(&self, symbol: &str) -> bool {
        self.authoritative.contains(symbol)
    }

    /// High-confidence path (`$TICKER`): length >= 2, listed when the
    /// authoritative set is present. The blocklist is deliberately skipped.
    pub fn allows_cashtag(&self, symbol: &str) -> bool {
        symbol.len() >= 2 && (!self.has_authoritative() || self.is_listed(symbol))
    }

    /// Low-confidence path (bare uppercase) and options tickers: not
    /// blocklisted, and listed when the authoritative set is present. The
    /// index allowlist bypasses the listing check.
    pub fn allows_bare(&self, symbol: &str) -> bool {
        if is_blocklisted(symbol) {
            return false;
        }
        if !self.has_authoritative() {
            return true;
        }
        self.is_listed(symbol) || INDEX_TICKERS.contains(&symbol)
    }
}

async fn load_or_fetch(cache_path: &Path) -> Result<HashSet<String>> {
    if cache_path.exists() {
        let raw = std::fs::read_to_string(cache_path)
            .with_context(|| format!("reading ticker cache at {}", cache_path.display()))?;
        let symbols: Vec<String> = serde_json::from_str(&raw).context("parsing ticker cache")?;
        return Ok(symbols.into_iter().collect());
    }

    let set = fetch_sec_tickers().await?;

    // Best-effort cache write; a failure here only costs a refetch next boot.
    if let Some(dir) = cache_path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let mut sorted: Vec<&String> = set.iter().collect();
    sorted.sort();
    if let Ok(json) = serde_json::to_string(&sorted) {
        if let Err(e) = std::fs::write(cache_path, json) {
            tracing::warn!(error = ?e, path = %cache_path.display(), "could not write ticker cache");
        }
    }
    Ok(set)
}

async fn fetch_sec_tickers() -> Result<HashSet<String>> {
    let client = reqwest::Client::builder()
        .user_agent("wsb-sentiment-tracker admin@example.com")
        .build()
        .context("building http client")?;
    let body = client
        .get(SEC_TICKERS_URL)
        .send()
        .await
        .context("fetching SEC tickers")?
        .error_for_status()
        .context("SEC tickers status")?
        .text()
        .await
        .context("reading SEC tickers body")?;

    let rows: HashMap<String, SecRow> = serde_json::from_str(&body).context("parsing SEC tickers")?;
    Ok(rows.into_values().map(|r| r.ticker.to_uppercase()).collect())
}
