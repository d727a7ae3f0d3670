//! Signal–price fusion: temporal join, classification, series analytics.
//!
//! The three stages are pure functions chained by [`fuse`]:
//!
//! ```text
//! prices ─┐
//!         ├─ join ─ classify ─ summarize ─► FusedSeries
//! events ─┘
//! ```
//!
//! None of them can fail: missing prices produce an empty series, missing or
//! unmatched events produce HOLD points.

pub mod classify;
pub mod join;
pub mod summary;

pub use classify::{annotate, classify, DEFAULT_PLACEHOLDER};
pub use join::{join, Joined};
pub use summary::{
    calendar_date, display_time, session_boundaries, summarize, ActionCounts, SeriesSummary,
};

use crate::config::{DisplayConfig, FusionConfig};
use crate::domain::{AnnotatedPoint, PricePoint, SignalEvent};
use serde::Serialize;

/// Output of one fusion pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedSeries {
    pub points: Vec<AnnotatedPoint>,
    pub summary: SeriesSummary,
}

/// Run join → classify → summarize over one symbol's inputs.
pub fn fuse(
    prices: &[PricePoint],
    events: &[SignalEvent],
    fusion: &FusionConfig,
    display: &DisplayConfig,
) -> FusedSeries {
    let joined = join(prices, events, fusion.tolerance_ms());
    let points = classify(joined, &fusion.placeholder_reason);
    let summary = summarize(&points, display.zone());
    FusedSeries { points, summary }
}
