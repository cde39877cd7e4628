//! # Earnings Analytics
//! Classifies historical post-earnings price moves into WSB buckets,
//! derives moon/tank percentages, a volatility figure, a direction streak,
//! and a bounded casino score. Pure computation here; fetching and the 24h
//! cache live on `EarningsOracle`.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ingest::types::{EarningsSample, MarketData};
use crate::store::SignalStore;

/// Cache entries older than this are logically absent.
pub const EARNINGS_CACHE_TTL_SECS: i64 = 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveClass {
    #[serde(rename = "MOON")]
    Moon,
    #[serde(rename = "PUMP")]
    Pump,
    #[serde(rename = "FLAT")]
    Flat,
    #[serde(rename = "DIP")]
    Dip,
    #[serde(rename = "TANK")]
    Tank,
}

/// Bucket a post-earnings percentage move. Boundaries are exclusive on the
/// way up (exactly +5.0 is PUMP) and inclusive on the way down (exactly
/// -2.0 is FLAT).
pub fn classify_move(pct: f64) -> MoveClass {
    if pct > 5.0 {
        MoveClass::Moon
    } else if pct > 2.0 {
        MoveClass::Pump
    } else if pct >= -2.0 {
        MoveClass::Flat
    } else if pct >= -5.0 {
        MoveClass::Dip
    } else {
        MoveClass::Tank
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsEvent {
    pub date: String,
    pub eps_estimate: Option<f64>,
    pub eps_actual: Option<f64>,
    pub surprise_pct: Option<f64>,
    pub price_before: f64,
    pub price_after: f64,
    pub move_pct: f64,
    pub classification: MoveClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsReport {
    pub symbol: String,
    pub events: usize,
    pub years_covered: f64,
    pub moon_pct: f64,
    pub tank_pct: f64,
    pub flat_pct: f64,
    pub avg_move: f64,
    pub max_moon: f64,
    pub max_tank: f64,
    pub volatility: f64,
    pub streak: usize,
    pub streak_direction: String,
    pub casino_score: f64,
    pub commentary: String,
    pub history: Vec<EarningsEvent>,
    pub error: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

impl EarningsReport {
    /// Well-formed "no data" response; the boundary never throws.
    pub fn unavailable(symbol: &str, reason: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            events: 0,
            years_covered: 0.0,
            moon_pct: 0.0,
            tank_pct: 0.0,
            flat_pct: 0.0,
            avg_move: 0.0,
            max_moon: 0.0,
            max_tank: 0.0,
            volatility: 0.0,
            streak: 0,
            streak_direction: "flat".into(),
            casino_score: 0.0,
            commentary: String::new(),
            history: Vec::new(),
            error: Some(reason),
            cached: false,
        }
    }
}

/// Turn raw earnings samples into a full report. Returns `None` when no
/// sample yields a computable move (zero/negative prices are skipped).
pub fn analyze_history(symbol: &str, samples: &[EarningsSample]) -> Option<EarningsReport> {
    let mut history: Vec<EarningsEvent> = Vec::with_capacity(samples.len());
    for s in samples {
        if s.price_before <= 0.0 {
            continue;
        }
        let move_pct = round2((s.price_after - s.price_before) / s.price_before * 100.0);
        let surprise_pct = match (s.eps_estimate, s.eps_actual) {
            (Some(est), Some(act)) if est != 0.0 => Some(round2((act - est) / est.abs() * 100.0)),
            _ => None,
        };
        history.push(EarningsEvent {
            date: s.date.clone(),
            eps_estimate: s.eps_estimate,
            eps_actual: s.eps_actual,
            surprise_pct,
            price_before: round2(s.price_before),
            price_after: round2(s.price_after),
            move_pct,
            classification: classify_move(move_pct),
        });
    }
    if history.is_empty() {
        return None;
    }

    // Most recent first; ISO dates sort lexicographically
    history.sort_by(|a, b| b.date.cmp(&a.date));

    let total = history.len();
    let moves: Vec<f64> = history.iter().map(|e| e.move_pct).collect();

    let moon_events = history
        .iter()
        .filter(|e| matches!(e.classification, MoveClass::Moon | MoveClass::Pump))
        .count();
    let tank_events = history
        .iter()
        .filter(|e| matches!(e.classification, MoveClass::Dip | MoveClass::Tank))
        .count();
    let flat_events = total - moon_events - tank_events;

    let moon_pct = round1(moon_events as f64 / total as f64 * 100.0);
    let tank_pct = round1(tank_events as f64 / total as f64 * 100.0);
    let flat_pct = round1(flat_events as f64 / total as f64 * 100.0);

    let mean = moves.iter().sum::<f64>() / total as f64;
    let avg_move = round2(mean);
    let max_moon = round2(moves.iter().cloned().fold(f64::MIN, f64::max));
    let max_tank = round2(moves.iter().cloned().fold(f64::MAX, f64::min));
    let volatility = round2(sample_stddev(&moves, mean));

    let (streak, streak_direction) = direction_streak(&history);
    let casino_score = round1((volatility * 1.5 + avg_move.abs() * 0.5).min(10.0));
    let commentary = commentary(moon_pct, tank_pct, volatility, avg_move, streak, &streak_direction);

    Some(EarningsReport {
        symbol: symbol.to_string(),
        events: total,
        years_covered: years_covered(&history),
        moon_pct,
        tank_pct,
        flat_pct,
        avg_move,
        max_moon,
        max_tank,
        volatility,
        streak,
        streak_direction,
        casino_score,
        commentary,
        history,
        error: None,
        cached: false,
    })
}

/// Sample standard deviation; 0.0 below two observations.
fn sample_stddev(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    var.sqrt()
}

/// Consecutive same-direction run walking back from the most recent event.
/// Direction buckets: moon above +2, tank below -2, flat between.
fn direction_streak(history: &[EarningsEvent]) -> (usize, String) {
    let mut streak = 0usize;
    let mut direction: Option<&str> = None;

    for e in history {
        let dir = if e.move_pct > 2.0 {
            "moon"
        } else if e.move_pct < -2.0 {
            "tank"
        } else {
            "flat"
        };
        match direction {
            None => {
                direction = Some(dir);
                streak = 1;
            }
            Some(d) if d == dir => streak += 1,
            Some(_) => break,
        }
    }

    (streak, direction.unwrap_or("flat").to_string())
}

fn years_covered(history: &[EarningsEvent]) -> f64 {
    let dates: Vec<NaiveDate> = history
        .iter()
        .filter_map(|e| NaiveDate::parse_from_str(&e.date, "%Y-%m-%d").ok())
        .collect();
    if dates.len() < 2 {
        return 0.0;
    }
    let min = dates.iter().min().expect("nonempty");
    let max = dates.iter().max().expect("nonempty");
    round1((*max - *min).num_days() as f64 / 365.25)
}

fn commentary(
    moon_pct: f64,
    tank_pct: f64,
    volatility: f64,
    avg_move: f64,
    streak: usize,
    streak_direction: &str,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    if moon_pct >= 70.0 {
        lines.push("This thing PRINTS after earnings \u{1F680}".into());
    } else if tank_pct >= 70.0 {
        lines.push("GUH. This stock hates earnings season \u{1F480}".into());
    } else if volatility > 8.0 && avg_move.abs() < 2.0 {
        lines.push("Pure casino. Flip a coin \u{1F3B0}".into());
    } else if (moon_pct - tank_pct).abs() < 15.0 {
        lines.push("Basically a coin toss after earnings \u{1F3B2}".into());
    } else if moon_pct >= 55.0 {
        lines.push("Leans bullish after earnings. Not a sure thing though \u{1F4C8}".into());
    } else if tank_pct >= 55.0 {
        lines.push("Tends to dump after earnings. Puts gang might eat \u{1F43B}".into());
    } else {
        lines.push("Mixed bag. Could go either way".into());
    }

    if streak >= 3 && streak_direction == "moon" {
        lines.push(format!("{streak} moons in a row \u{1F525}"));
    } else if streak >= 3 && streak_direction == "tank" {
        lines.push(format!("{streak} tanks in a row \u{1F4C9}"));
    }

    if volatility > 10.0 {
        lines.push("Absolute rollercoaster around earnings. Strap in".into());
    } else if volatility < 2.0 {
        lines.push("Barely moves on earnings. Theta gang wins again".into());
    }

    lines.join(" ")
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Cached earnings analytics over an injected market-data source. The cache
/// row is the unit of idempotence: recomputation simply overwrites it.
pub struct EarningsOracle {
    market: Arc<dyn MarketData>,
    store: Arc<SignalStore>,
}

impl EarningsOracle {
    pub fn new(market: Arc<dyn MarketData>, store: Arc<SignalStore>) -> Self {
        Self { market, store }
    }

    /// Serve from cache when fresh (< 24h), otherwise recompute and upsert.
    /// Always returns a well-formed report; failures land in `error`.
    pub async fn report(&self, symbol: &str) -> EarningsReport {
        let symbol = symbol.to_uppercase();
        let now = chrono::Utc::now().timestamp();

        match self.store.earnings_cache_get(&symbol, now) {
            Ok(Some(json)) => {
                if let Ok(mut report) = serde_json::from_str::<EarningsReport>(&json) {
                    report.cached = true;
                    return report;
                }
                // Unreadable blob: fall through and recompute
                tracing::warn!(%symbol, "discarding unparseable earnings cache entry");
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, %symbol, "earnings cache read failed"),
        }

        let samples = match self.market.earnings_history(&symbol).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = ?e, %symbol, "market data lookup failed");
                return EarningsReport::unavailable(
                    &symbol,
                    format!("No earnings data available for {symbol}"),
                );
            }
        };
        if samples.is_empty() {
            return EarningsReport::unavailable(
                &symbol,
                format!("No earnings data available for {symbol}"),
            );
        }

        let report = match analyze_history(&symbol, &samples) {
            Some(r) => r,
            None => {
                return EarningsReport::unavailable(
                    &symbol,
                    format!("Could not calculate earnings moves for {symbol}"),
                )
            }
        };

        match serde_json::to_string(&report) {
            Ok(json) => {
                if let Err(e) = self.store.earnings_cache_put(&symbol, &json, now) {
                    tracing::warn!(error = ?e, %symbol, "earnings cache write failed");
                }
            }
            Err(e) => tracing::warn!(error = ?e, %symbol, "earnings report serialization failed"),
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(date: &str, before: f64, after: f64) -> EarningsSample {
        EarningsSample {
            date: date.into(),
            price_before: before,
            price_after: after,
            eps_estimate: None,
            eps_actual: None,
        }
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(classify_move(5.1), MoveClass::Moon);
        assert_eq!(classify_move(5.0), MoveClass::Pump, "+5.0 is not a moon");
        assert_eq!(classify_move(2.0), MoveClass::Flat);
        assert_eq!(classify_move(-2.0), MoveClass::Flat, "-2.0 is still flat");
        assert_eq!(classify_move(-2.01), MoveClass::Dip);
        assert_eq!(classify_move(-5.0), MoveClass::Dip);
        assert_eq!(classify_move(-5.01), MoveClass::Tank);
    }

    #[test]
    fn report_aggregates_and_sorts_recent_first() {
        let samples = vec![
            sample("2024-01-25", 100.0, 110.0), // +10 MOON
            sample("2024-04-25", 100.0, 104.0), // +4 PUMP
            sample("2024-07-25", 100.0, 99.0),  // -1 FLAT
            sample("2024-10-24", 100.0, 92.0),  // -8 TANK
        ];
        let r = analyze_history("TEST", &samples).expect("report");
        assert_eq!(r.events, 4);
        assert_eq!(r.history[0].date, "2024-10-24");
        assert_eq!(r.moon_pct, 50.0);
        assert_eq!(r.tank_pct, 25.0);
        assert_eq!(r.flat_pct, 25.0);
        assert_eq!(r.max_moon, 10.0);
        assert_eq!(r.max_tank, -8.0);
    }

    #[test]
    fn streak_walks_back_from_most_recent() {
        let samples = vec![
            sample("2024-10-24", 100.0, 106.0), // moon
            sample("2024-07-25", 100.0, 103.0), // moon
            sample("2024-04-25", 100.0, 95.0),  // tank, breaks the run
            sample("2024-01-25", 100.0, 104.0),
        ];
        let r = analyze_history("TEST", &samples).expect("report");
        assert_eq!(r.streak, 2);
        assert_eq!(r.streak_direction, "moon");
    }

    #[test]
    fn volatility_is_zero_below_two_events() {
        let r = analyze_history("TEST", &[sample("2024-01-25", 100.0, 103.0)]).expect("report");
        assert_eq!(r.volatility, 0.0);
    }

    #[test]
    fn casino_score_is_capped_at_ten() {
        let samples = vec![
            sample("2024-01-25", 100.0, 140.0),
            sample("2024-04-25", 100.0, 60.0),
            sample("2024-07-25", 100.0, 135.0),
        ];
        let r = analyze_history("TEST", &samples).expect("report");
        assert_eq!(r.casino_score, 10.0);
    }

    #[test]
    fn unusable_prices_are_skipped() {
        assert!(analyze_history("TEST", &[sample("2024-01-25", 0.0, 10.0)]).is_none());
        assert!(analyze_history("TEST", &[]).is_none());
    }

    #[test]
    fn eps_surprise_is_computed_when_both_sides_present() {
        let mut s = sample("2024-01-25", 100.0, 103.0);
        s.eps_estimate = Some(2.0);
        s.eps_actual = Some(2.5);
        let r = analyze_history("TEST", &[s]).expect("report");
        assert_eq!(r.history[0].surprise_pct, Some(25.0));
    }
}
