//! SignalEvent: a timestamped trading recommendation from the analysis process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display classification of a price point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized action '{0}' (expected BUY, SELL or HOLD)")]
pub struct UnknownAction(pub String);

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }

    /// Parse a wire value, falling back to `Hold` for anything unrecognized.
    ///
    /// A malformed action never fails the series; it is logged and rendered as HOLD.
    pub fn from_wire_lenient(raw: &str) -> Self {
        match raw.parse() {
            Ok(action) => action,
            Err(e) => {
                tracing::warn!(error = %e, "malformed signal action, treating as HOLD");
                Action::Hold
            }
        }
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            "HOLD" => Ok(Action::Hold),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decision event produced upstream.
///
/// Events are sparse relative to prices and are not aligned to sampling
/// instants; the temporal join decides which price point (if any) they annotate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub time: DateTime<Utc>,
    pub action: Action,
    /// Confidence score, roughly −100..100.
    pub score: f64,
    pub rationale: String,
}

impl SignalEvent {
    pub fn new(time: DateTime<Utc>, action: Action, score: f64, rationale: impl Into<String>) -> Self {
        Self {
            time,
            action,
            score,
            rationale: rationale.into(),
        }
    }

    pub fn time_ms(&self) -> i64 {
        self.time.timestamp_millis()
    }
}
