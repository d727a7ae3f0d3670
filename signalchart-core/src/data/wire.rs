//! Wire records shared by the HTTP and file loaders.
//!
//! Prices: `{ "time": <epoch ms>, "price": <number> }`.
//! Signals: `{ "time": <epoch ms>, "action": "BUY"|"SELL"|"HOLD", "score": <number>, "reason": <string> }`.
//! The storage schema's column names `timestamp` and `signal_score` are
//! accepted as aliases, and `score` may arrive as a decimal string.

use crate::domain::{Action, PricePoint, SignalEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(alias = "timestamp")]
    pub time: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(alias = "timestamp")]
    pub time: i64,
    pub action: String,
    #[serde(alias = "signal_score", default, deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => 0.0,
        Some(NumberOrString::Number(n)) => n,
        Some(NumberOrString::Text(s)) => s.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(score = %s, "unparseable signal score, using 0");
            0.0
        }),
    })
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Normalize price records: drop unusable rows, sort ascending, and keep the
/// last record for any repeated time.
pub fn prices_from_wire(records: Vec<PriceRecord>) -> Vec<PricePoint> {
    let total = records.len();
    let mut points: Vec<PricePoint> = records
        .into_iter()
        .filter_map(|r| from_millis(r.time).map(|t| PricePoint::new(t, r.price)))
        .filter(PricePoint::is_valid)
        .collect();
    points.sort_by_key(|p| p.time);

    let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
    for p in points {
        match out.last_mut() {
            Some(last) if last.time == p.time => *last = p,
            _ => out.push(p),
        }
    }

    if out.len() < total {
        tracing::debug!(
            kept = out.len(),
            dropped = total - out.len(),
            "normalized price records"
        );
    }
    out
}

/// Convert signal records to events. Unknown actions become HOLD; records
/// with an unrepresentable time are dropped.
pub fn events_from_wire(records: Vec<SignalRecord>) -> Vec<SignalEvent> {
    records
        .into_iter()
        .filter_map(|r| {
            let Some(time) = from_millis(r.time) else {
                tracing::warn!(time = r.time, "signal record with invalid time dropped");
                return None;
            };
            let score = if r.score.is_finite() { r.score } else { 0.0 };
            Some(SignalEvent::new(
                time,
                Action::from_wire_lenient(&r.action),
                score,
                r.reason.unwrap_or_default(),
            ))
        })
        .collect()
}

impl From<&PricePoint> for PriceRecord {
    fn from(p: &PricePoint) -> Self {
        Self {
            time: p.time_ms(),
            price: p.price,
        }
    }
}

impl From<&SignalEvent> for SignalRecord {
    fn from(e: &SignalEvent) -> Self {
        Self {
            time: e.time_ms(),
            action: e.action.as_str().to_string(),
            score: e.score,
            reason: Some(e.rationale.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_aliases_and_string_score() {
        let json = r#"[
            {"timestamp": 1709564400000, "action": "buy", "signal_score": "42.50", "reason": "RSI oversold"},
            {"time": 1709565600000, "action": "SELL", "score": -61, "reason": null},
            {"time": 1709566800000, "action": "HOLD", "score": null}
        ]"#;
        let records: Vec<SignalRecord> = serde_json::from_str(json).unwrap();
        let events = events_from_wire(records);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].action, Action::Buy);
        assert_eq!(events[0].score, 42.5);
        assert_eq!(events[0].rationale, "RSI oversold");
        assert_eq!(events[1].score, -61.0);
        assert_eq!(events[1].rationale, "");
        assert_eq!(events[2].score, 0.0);
    }

    #[test]
    fn malformed_action_kept_as_hold() {
        let json = r#"[{"time": 1709564400000, "action": "STRONG_BUY", "score": 80, "reason": "momentum"}]"#;
        let records: Vec<SignalRecord> = serde_json::from_str(json).unwrap();
        let events = events_from_wire(records);
        assert_eq!(events[0].action, Action::Hold);
        assert_eq!(events[0].score, 80.0);
        assert_eq!(events[0].rationale, "momentum");
    }

    #[test]
    fn prices_sorted_deduped_and_filtered() {
        let records = vec![
            PriceRecord { time: 3_000, price: 3.0 },
            PriceRecord { time: 1_000, price: 1.0 },
            PriceRecord { time: 2_000, price: f64::NAN },
            PriceRecord { time: 3_000, price: 3.5 },
            PriceRecord { time: 4_000, price: -1.0 },
        ];
        let points = prices_from_wire(records);
        let got: Vec<(i64, f64)> = points.iter().map(|p| (p.time_ms(), p.price)).collect();
        assert_eq!(got, vec![(1_000, 1.0), (3_000, 3.5)]);
    }

    #[test]
    fn price_timestamp_alias() {
        let r: PriceRecord = serde_json::from_str(r#"{"timestamp": 5, "price": 1.25}"#).unwrap();
        assert_eq!(r, PriceRecord { time: 5, price: 1.25 });
    }
}
