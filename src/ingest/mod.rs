// src/ingest/mod.rs
pub mod providers;
pub mod types;

use once_cell::sync::OnceCell;

/// Normalize forum text before extraction: decode HTML entities, normalize
/// curly quotes, collapse whitespace, trim. No truncation and no punctuation
/// stripping: the extractors must see the whole text (a trailing "$GME" or a
/// "3/27" date is signal, not noise).
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode (reddit bodies arrive entity-escaped without raw_json)
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Char-boundary-safe prefix of at most `max_chars` characters.
pub fn snippet(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
