//! # Options Extractor
//! Recognizes option-position chatter in three non-exclusive passes:
//!
//!   NVDA 200c 3/27        -> strike 200, call, dated
//!   SPY 680p 0DTE         -> strike 680, put, 0DTE via context
//!   UNH 295 calls friday  -> strike 295, call, weekly via day name
//!   SPX 0DTE              -> keyword-only, ticker-level expiry signal
//!
//! Candidates are deduplicated in first-seen order. Strike-bearing passes
//! key on (ticker, strike, type); the keyword-only pass keys on
//! (ticker, category). The two key spaces never collide.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::vocab::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "call" => Some(OptionType::Call),
            "put" => Some(OptionType::Put),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpiryCategory {
    #[serde(rename = "0DTE")]
    ZeroDte,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "LEAPS")]
    Leaps,
    #[serde(rename = "dated")]
    Dated,
}

impl ExpiryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryCategory::ZeroDte => "0DTE",
            ExpiryCategory::Weekly => "weekly",
            ExpiryCategory::Monthly => "monthly",
            ExpiryCategory::Leaps => "LEAPS",
            ExpiryCategory::Dated => "dated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "0DTE" => Some(ExpiryCategory::ZeroDte),
            "weekly" => Some(ExpiryCategory::Weekly),
            "monthly" => Some(ExpiryCategory::Monthly),
            "LEAPS" => Some(ExpiryCategory::Leaps),
            "dated" => Some(ExpiryCategory::Dated),
            _ => None,
        }
    }
}

/// One extracted options signal. Strike and type are both absent for
/// keyword-only matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionCandidate {
    pub ticker: String,
    pub strike: Option<f64>,
    pub option_type: Option<OptionType>,
    pub expiry_raw: Option<String>,
    pub expiry_category: Option<ExpiryCategory>,
    pub raw_match: String,
}

// Pattern a: TICKER <digits><c|p> [M/D[/YY]]  e.g. "NVDA 200c 3/27"
static RE_STRIKE_LETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?([A-Z]{1,5})\s+(\d{1,5})([cCpP])\s*(\d{1,2}/\d{1,2}(?:/\d{2,4})?)?")
        .expect("strike+letter regex")
});

// Pattern b: TICKER <digits> calls|puts  e.g. "UNH 295 calls expiring Friday"
static RE_STRIKE_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?([A-Z]{1,5})\s+(\d{1,5})\s+((?i:calls?|puts?))\b").expect("strike+word regex")
});

// Pattern c: TICKER <expiry-keyword>  e.g. "SPX 0DTE", "NVDA weeklies"
static RE_KEYWORD_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$?([A-Z]{1,5})\s+((?i:0dte|weekl(?:y|ys|ies)|dail(?:y|ys|ies)|fds?|monthl(?:y|ys|ies)|leaps?))\b",
    )
    .expect("keyword-only regex")
});

/// Many-to-one expiry keyword normalization, scanned in this order.
#[rustfmt::skip]
const EXPIRY_KEYWORDS: &[(&str, ExpiryCategory)] = &[
    ("0dte", ExpiryCategory::ZeroDte),
    ("dailies", ExpiryCategory::ZeroDte),
    ("dailys", ExpiryCategory::ZeroDte),
    ("daily", ExpiryCategory::ZeroDte),
    ("tomorrow", ExpiryCategory::ZeroDte),
    ("tmrw", ExpiryCategory::ZeroDte),
    ("weeklies", ExpiryCategory::Weekly),
    ("weeklys", ExpiryCategory::Weekly),
    ("weekly", ExpiryCategory::Weekly),
    ("fds", ExpiryCategory::Weekly),
    ("fd", ExpiryCategory::Weekly),
    ("eow", ExpiryCategory::Weekly),
    ("next week", ExpiryCategory::Weekly),
    ("next friday", ExpiryCategory::Weekly),
    ("monthlies", ExpiryCategory::Monthly),
    ("monthlys", ExpiryCategory::Monthly),
    ("monthly", ExpiryCategory::Monthly),
    ("eom", ExpiryCategory::Monthly),
    ("leaps", ExpiryCategory::Leaps),
    ("leap", ExpiryCategory::Leaps),
];

const DAY_NAMES: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "mon", "tue", "wed", "thu", "fri",
];

/// Dedup key. Strike-bearing and keyword-only candidates live in disjoint
/// key spaces on purpose; see module docs.
#[derive(PartialEq, Eq, Hash)]
enum DedupKey {
    Strike(String, u64, OptionType),
    Keyword(String, Option<ExpiryCategory>),
}

/// Extract option candidates from `text`, first-seen order, deduplicated.
/// Deterministic; never fails; empty input yields an empty list.
pub fn extract_options(text: &str, vocab: &Vocabulary) -> Vec<OptionCandidate> {
    let mut out = Vec::new();
    if text.is_empty() {
        return out;
    }
    let mut seen: HashSet<DedupKey> = HashSet::new();

    // Pass a: explicit strike + c/p letter, optional literal date
    for caps in RE_STRIKE_LETTER.captures_iter(text) {
        let ticker = caps[1].to_string();
        if !vocab.allows_bare(&ticker) {
            continue;
        }
        let strike: f64 = match caps[2].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        let option_type = if caps[3].eq_ignore_ascii_case("c") {
            OptionType::Call
        } else {
            OptionType::Put
        };
        let expiry_raw = caps.get(4).map(|m| m.as_str().to_string());
        let whole = caps.get(0).expect("match 0");
        let expiry_category =
            categorize_expiry(expiry_raw.as_deref(), &context_after(text, whole.end(), 30));

        let key = DedupKey::Strike(ticker.clone(), strike.to_bits(), option_type);
        if seen.insert(key) {
            out.push(OptionCandidate {
                ticker,
                strike: Some(strike),
                option_type: Some(option_type),
                expiry_raw,
                expiry_category,
                raw_match: whole.as_str().trim().to_string(),
            });
        }
    }

    // Pass b: strike + plural word, expiry inferred from trailing context
    for caps in RE_STRIKE_WORD.captures_iter(text) {
        let ticker = caps[1].to_string();
        if !vocab.allows_bare(&ticker) {
            continue;
        }
        let strike: f64 = match caps[2].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        let option_type = if caps[3].to_ascii_lowercase().starts_with('c') {
            OptionType::Call
        } else {
            OptionType::Put
        };
        let whole = caps.get(0).expect("match 0");
        let expiry_category = categorize_expiry(None, &context_after(text, whole.end(), 40));

        let key = DedupKey::Strike(ticker.clone(), strike.to_bits(), option_type);
        if seen.insert(key) {
            out.push(OptionCandidate {
                ticker,
                strike: Some(strike),
                option_type: Some(option_type),
                expiry_raw: None,
                expiry_category,
                raw_match: whole.as_str().trim().to_string(),
            });
        }
    }

    // Pass c: ticker-level expiry keyword, no strike
    for caps in RE_KEYWORD_ONLY.captures_iter(text) {
        let ticker = caps[1].to_string();
        if !vocab.allows_bare(&ticker) {
            continue;
        }
        let keyword = caps[2].to_string();
        let expiry_category = lookup_keyword(&keyword.to_lowercase());
        let whole = caps.get(0).expect("match 0");

        let key = DedupKey::Keyword(ticker.clone(), expiry_category);
        if seen.insert(key) {
            out.push(OptionCandidate {
                ticker,
                strike: None,
                option_type: None,
                expiry_raw: Some(keyword),
                expiry_category,
                raw_match: whole.as_str().trim().to_string(),
            });
        }
    }

    out
}

/// Precedence: explicit date > contextual keyword > weekday name > none.
/// An explicit date is always the uniform "dated" bucket; no calendar math.
fn categorize_expiry(date: Option<&str>, context: &str) -> Option<ExpiryCategory> {
    if date.is_some() {
        return Some(ExpiryCategory::Dated);
    }
    let lower = context.to_lowercase();
    for (kw, cat) in EXPIRY_KEYWORDS {
        if lower.contains(kw) {
            return Some(*cat);
        }
    }
    for day in DAY_NAMES {
        if lower.contains(day) {
            return Some(ExpiryCategory::Weekly);
        }
    }
    None
}

fn lookup_keyword(lowered: &str) -> Option<ExpiryCategory> {
    EXPIRY_KEYWORDS
        .iter()
        .find(|(kw, _)| *kw == lowered)
        .map(|(_, cat)| *cat)
}

/// Up to `max_chars` characters following byte offset `end`.
fn context_after(text: &str, end: usize, max_chars: usize) -> String {
    text[end..].chars().take(max_chars).collect()
}
