//! # Sentiment Scorer
//! VADER compound polarity extended with a WSB slang lexicon and an emoji
//! intensity table. Built once at startup and shared by reference; the
//! scorer is immutable after construction.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Supplemental domain lexicon (word -> intensity, -4.0 to +4.0). Applied as
/// a second lexicon component on top of VADER's compound score.
#[rustfmt::skip]
const WSB_LEXICON: &[(&str, f64)] = &[
    // Bullish
    ("moon", 3.0), ("mooning", 3.5), ("moonshot", 3.0),
    ("tendies", 2.5), ("tendie", 2.5),
    ("rocket", 2.5), ("rockets", 2.5),
    ("bullish", 3.0), ("calls", 1.5),
    ("squeeze", 2.0), ("squeezing", 2.5),
    ("diamond", 2.0), ("diamonds", 2.0),
    ("hodl", 2.0), ("hodling", 2.0),
    ("printer", 1.5), ("brrrr", 2.0), ("brrr", 2.0),
    ("lambo", 2.5), ("yolo", 1.5),
    ("gains", 2.0), ("gainz", 2.0),
    ("rip", 2.0), ("rippin", 2.5),
    ("chad", 1.5), ("alpha", 1.5),
    ("undervalued", 2.0), ("breakout", 2.0), ("fomo", 1.0),
    ("cheapies", 1.5), ("loading", 1.0), ("loaded", 1.5),
    ("accumulate", 1.5), ("accumulating", 1.5),
    ("buy", 1.0), ("buying", 1.0), ("bought", 1.0),
    // Bearish
    ("guh", -3.5), ("bearish", -3.0), ("puts", -1.5),
    ("drill", -2.5), ("drilling", -2.5),
    ("tanking", -3.0), ("tank", -2.5), ("tanked", -3.0),
    ("crash", -3.0), ("crashed", -3.0), ("crashing", -3.0),
    ("dump", -2.5), ("dumped", -2.5), ("dumping", -3.0),
    ("rugpull", -3.5), ("rug", -2.0),
    ("bagholder", -2.5), ("bagholding", -2.5), ("bags", -2.0),
    ("loss", -2.0), ("losses", -2.0),
    ("dead", -2.5), ("dying", -2.5),
    ("rekt", -3.0), ("wrecked", -2.5),
    ("overvalued", -2.0),
    ("scam", -3.0), ("fraud", -3.0), ("ponzi", -3.0),
    ("bankruptcy", -3.5), ("bankrupt", -3.5), ("delisted", -3.0),
    ("margin", -1.5), ("overleveraged", -2.5),
    ("sell", -1.0), ("selling", -1.5), ("sold", -1.0),
    ("short", -1.0), ("shorting", -1.5),
];

/// Emoji sentiment intensities, same -4..+4 scale as the lexicon.
#[rustfmt::skip]
const EMOJI_SCORES: &[(&str, f64)] = &[
    ("\u{1F680}", 2.5),  // rocket
    ("\u{1F319}", 2.0),  // moon
    ("\u{1F48E}", 2.0),  // gem
    ("\u{1F64C}", 1.5),  // raised hands
    ("\u{1F98D}", 1.0),  // gorilla
    ("\u{1F4C8}", 2.0),  // chart up
    ("\u{1F4B0}", 1.5),  // money bag
    ("\u{1F911}", 1.5),  // money face
    ("\u{1F525}", 1.5),  // fire
    ("\u{1F402}", 1.5),  // ox
    ("\u{1F4C9}", -2.0), // chart down
    ("\u{1F480}", -2.0), // skull
    ("\u{1F921}", -2.5), // clown
    ("\u{1F5D1}\u{FE0F}", -2.0), // wastebasket
    ("\u{1F62D}", -1.5), // loud crying
    ("\u{1F43B}", -1.5), // bear
];

static WSB_MAP: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| WSB_LEXICON.iter().copied().collect());

/// VADER's normalization constant; keeps the supplemental component on the
/// same scale as the compound score.
const NORMALIZE_ALPHA: f64 = 15.0;

/// Lexicon-plus-heuristic polarity scorer. Construct once, inject everywhere.
pub struct SentimentScorer {
    vader: SentimentIntensityAnalyzer<'static>,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            vader: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Score text polarity in [-1.0, 1.0]. Empty text scores exactly 0.0.
    /// Blends VADER compound, the WSB lexicon, and emoji: when any emoji is
    /// present the final score is 0.7 x lexicon + 0.3 x normalized emoji
    /// average.
    pub fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let compound = self
            .vader
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0);

        let lexicon_score = (compound + self.wsb_component(text)).clamp(-1.0, 1.0);

        let (emoji_total, emoji_count) = emoji_tally(text);
        let blended = if emoji_count > 0 {
            let emoji_avg = emoji_total / emoji_count as f64;
            0.7 * lexicon_score + 0.3 * (emoji_avg / 4.0)
        } else {
            lexicon_score
        };

        blended.clamp(-1.0, 1.0)
    }

    /// Raw WSB intensity sum over tokens, normalized VADER-style so it lands
    /// in (-1, 1) and can be added to the compound.
    fn wsb_component(&self, text: &str) -> f64 {
        let raw: f64 = tokenize(text)
            .filter_map(|t| WSB_MAP.get(t.as_str()))
            .sum();
        if raw == 0.0 {
            0.0
        } else {
            raw / (raw * raw + NORMALIZE_ALPHA).sqrt()
        }
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Sum of emoji intensities and occurrence count.
fn emoji_tally(text: &str) -> (f64, usize) {
    let mut total = 0.0;
    let mut count = 0usize;
    for (emoji, score) in EMOJI_SCORES {
        let n = text.matches(emoji).count();
        if n > 0 {
            total += score * n as f64;
            count += n;
        }
    }
    (total, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_exactly_zero() {
        let s = SentimentScorer::new();
        assert_eq!(s.score(""), 0.0);
        assert_eq!(s.score("   "), 0.0);
    }

    #[test]
    fn scores_stay_in_bounds() {
        let s = SentimentScorer::new();
        let samples = [
            "moon moon moon mooning rocket tendies lambo \u{1F680}\u{1F680}\u{1F680}",
            "guh crash bankrupt rekt rugpull drilling \u{1F480}\u{1F921}",
            "AAPL reported earnings today",
            "!!!",
        ];
        for t in samples {
            let v = s.score(t);
            assert!((-1.0..=1.0).contains(&v), "score {v} out of range for {t:?}");
        }
    }

    #[test]
    fn wsb_slang_moves_the_score() {
        let s = SentimentScorer::new();
        assert!(s.score("GME to the moon, diamond hands, tendies incoming") > 0.0);
        assert!(s.score("guh. portfolio tanking, absolute bagholder") < 0.0);
    }

    #[test]
    fn emoji_blend_shifts_a_neutral_text() {
        let s = SentimentScorer::new();
        let plain = s.score("AAPL 150 by friday");
        let rockets = s.score("AAPL 150 by friday \u{1F680}\u{1F680}");
        assert!(rockets > plain);
    }

    #[test]
    fn scoring_is_deterministic() {
        let s = SentimentScorer::new();
        let t = "YOLO $TSLA calls \u{1F680} this prints";
        assert_eq!(s.score(t), s.score(t));
    }
}
