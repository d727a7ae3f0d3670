//! AnnotatedPoint: a price point after fusion with its (optional) signal event.

use super::signal::Action;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single plot channel a classified point is drawn on.
///
/// Internally a point carries exactly one tagged channel; it is lowered to
/// three parallel nullable values only at the renderer boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotChannel {
    Buy(f64),
    Sell(f64),
    Hold(f64),
}

impl PlotChannel {
    pub fn for_action(action: Action, price: f64) -> Self {
        match action {
            Action::Buy => PlotChannel::Buy(price),
            Action::Sell => PlotChannel::Sell(price),
            Action::Hold => PlotChannel::Hold(price),
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            PlotChannel::Buy(v) | PlotChannel::Sell(v) | PlotChannel::Hold(v) => v,
        }
    }

    /// Lower to the renderer's three-series representation.
    pub fn lower(&self) -> PlotValues {
        let mut values = PlotValues::default();
        match *self {
            PlotChannel::Buy(v) => values.buy_value = Some(v),
            PlotChannel::Sell(v) => values.sell_value = Some(v),
            PlotChannel::Hold(v) => values.hold_value = Some(v),
        }
        values
    }
}

/// Three mutually exclusive plot slots. Unset slots are omitted when
/// serialized, never written as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_value: Option<f64>,
}

impl PlotValues {
    /// Number of populated slots (1 for every lowered channel).
    pub fn set_count(&self) -> usize {
        [self.buy_value, self.sell_value, self.hold_value]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

/// A price point enriched with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPoint {
    pub time: DateTime<Utc>,
    pub price: f64,
    pub action: Action,
    pub score: f64,
    pub rationale: String,
    /// Whether a signal event was attached by the join.
    pub matched: bool,
}

impl AnnotatedPoint {
    pub fn channel(&self) -> PlotChannel {
        PlotChannel::for_action(self.action, self.price)
    }

    pub fn plot_values(&self) -> PlotValues {
        self.channel().lower()
    }
}
