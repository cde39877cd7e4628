//! # Ticker Extractor
//! Two-pass candidate detection over one text unit: `$TICKER` cashtags
//! (high confidence, blocklist skipped) and bare 2-5 letter uppercase words
//! (low confidence, blocklist + authoritative-list filtered).

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::vocab::Vocabulary;

static RE_CASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z]{1,5})\b").expect("cashtag regex"));

static RE_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{2,5})\b").expect("bare ticker regex"));

/// Extract the set of tickers discussed in `text`. Deterministic; never
/// fails; empty input yields an empty set.
pub fn extract_tickers(text: &str, vocab: &Vocabulary) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    if text.is_empty() {
        return found;
    }

    // Pass 1: $TICKER. An explicit prefix is deliberate, skip the blocklist
    for caps in RE_CASHTAG.captures_iter(text) {
        let symbol = caps[1].to_ascii_uppercase();
        if vocab.allows_cashtag(&symbol) {
            found.insert(symbol);
        }
    }

    // Pass 2: bare uppercase words, filtered against blocklist + listing
    for caps in RE_BARE.captures_iter(text) {
        let symbol = &caps[1];
        if vocab.allows_bare(symbol) {
            found.insert(symbol.to_string());
        }
    }

    found
}
