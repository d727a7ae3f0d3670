//! Renderer payload: the JSON contract with the chart front end.
//!
//! The renderer draws exactly what is here; it never re-joins or re-classifies.

use serde::Serialize;
use signalchart_core::data::DataSource;
use signalchart_core::domain::{Action, AnnotatedPoint, PlotValues};
use signalchart_core::fusion::{display_time, FusedSeries, SeriesSummary};
use signalchart_core::zone::ExchangeZone;

/// One chart row. Exactly one of `buyValue` / `sellValue` / `holdValue` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    /// Epoch milliseconds.
    pub time: i64,
    pub display_time: String,
    pub price: f64,
    pub action: Action,
    pub score: f64,
    pub reason: String,
    #[serde(flatten)]
    pub plot: PlotValues,
}

impl ChartRow {
    pub fn from_point(point: &AnnotatedPoint, zone: ExchangeZone) -> Self {
        Self {
            time: point.time.timestamp_millis(),
            display_time: display_time(point.time, zone),
            price: point.price,
            action: point.action,
            score: point.score,
            reason: point.rationale.clone(),
            plot: point.plot_values(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub symbol: String,
    pub source: DataSource,
    pub signal_source: DataSource,
    pub rows: Vec<ChartRow>,
    pub summary: SeriesSummary,
    /// Session boundaries formatted as `MM-dd HH:mm`, for reference lines.
    pub session_labels: Vec<String>,
    /// Present when the series is synthetic, to reproduce it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthetic_seed: Option<u64>,
}

impl ChartPayload {
    pub fn build(
        symbol: &str,
        source: DataSource,
        signal_source: DataSource,
        fused: FusedSeries,
        zone: ExchangeZone,
    ) -> Self {
        let rows = fused
            .points
            .iter()
            .map(|p| ChartRow::from_point(p, zone))
            .collect();
        let session_labels = fused
            .summary
            .session_boundaries
            .iter()
            .map(|t| display_time(*t, zone))
            .collect();
        Self {
            symbol: symbol.to_string(),
            source,
            signal_source,
            rows,
            summary: fused.summary,
            session_labels,
            synthetic_seed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
