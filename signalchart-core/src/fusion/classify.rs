//! Classification: turn joined records into annotated points.

use super::join::Joined;
use crate::domain::{Action, AnnotatedPoint};

/// Rationale shown for points the analysis process has not covered yet.
pub const DEFAULT_PLACEHOLDER: &str = "No analysis available for this point yet";

/// Annotate a single joined record.
pub fn annotate(joined: Joined, placeholder: &str) -> AnnotatedPoint {
    let Joined { point, event } = joined;
    match event {
        Some(ev) => AnnotatedPoint {
            time: point.time,
            price: point.price,
            action: ev.action,
            score: ev.score,
            rationale: ev.rationale,
            matched: true,
        },
        None => AnnotatedPoint {
            time: point.time,
            price: point.price,
            action: Action::Hold,
            score: 0.0,
            rationale: placeholder.to_string(),
            matched: false,
        },
    }
}

/// Annotate a whole joined series, preserving order and cardinality.
pub fn classify(joined: Vec<Joined>, placeholder: &str) -> Vec<AnnotatedPoint> {
    joined
        .into_iter()
        .map(|j| annotate(j, placeholder))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PricePoint, SignalEvent};
    use chrono::{TimeZone, Utc};

    fn joined(event: Option<SignalEvent>) -> Joined {
        Joined {
            point: PricePoint::new(Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap(), 10.05),
            event,
        }
    }

    #[test]
    fn unmatched_defaults_to_hold() {
        let ap = annotate(joined(None), DEFAULT_PLACEHOLDER);
        assert_eq!(ap.action, Action::Hold);
        assert_eq!(ap.score, 0.0);
        assert_eq!(ap.rationale, DEFAULT_PLACEHOLDER);
        assert!(!ap.matched);
        assert_eq!(ap.plot_values().hold_value, Some(10.05));
    }

    #[test]
    fn matched_copies_event_fields() {
        let ev = SignalEvent::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 14, 59, 0).unwrap(),
            Action::Sell,
            -60.0,
            "MACD death cross",
        );
        let ap = annotate(joined(Some(ev)), DEFAULT_PLACEHOLDER);
        assert_eq!(ap.action, Action::Sell);
        assert_eq!(ap.score, -60.0);
        assert_eq!(ap.rationale, "MACD death cross");
        assert!(ap.matched);
        let values = ap.plot_values();
        assert_eq!(values.sell_value, Some(10.05));
        assert_eq!(values.set_count(), 1);
    }

    #[test]
    fn matched_hold_plots_on_hold_channel() {
        let ev = SignalEvent::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap(),
            Action::Hold,
            5.0,
            "neutral",
        );
        let ap = annotate(joined(Some(ev)), "n/a");
        assert!(ap.matched);
        assert_eq!(ap.plot_values().hold_value, Some(10.05));
        assert_eq!(ap.score, 5.0);
    }

    #[test]
    fn custom_placeholder_is_used() {
        let out = classify(vec![joined(None), joined(None)], "pending");
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.rationale == "pending"));
    }
}
