//! PricePoint: one timestamped market price observation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single price observation for one symbol.
///
/// A price series is ordered ascending by `time` with one observation per
/// sampling interval, so times are unique within a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(time: DateTime<Utc>, price: f64) -> Self {
        Self { time, price }
    }

    /// Epoch milliseconds, the unit used on the wire and by the join.
    pub fn time_ms(&self) -> i64 {
        self.time.timestamp_millis()
    }

    /// A usable observation has a finite, strictly positive price.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// True if `points` is strictly ascending by time (and therefore has unique times).
pub fn is_strictly_ascending(points: &[PricePoint]) -> bool {
    points.windows(2).all(|w| w[0].time < w[1].time)
}
