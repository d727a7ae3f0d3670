//! Series analytics: extrema, latest record, session boundaries, signal tallies.

use crate::domain::{Action, AnnotatedPoint};
use crate::zone::ExchangeZone;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Display format for boundary labels and row times.
pub const DISPLAY_FORMAT: &str = "%m-%d %H:%M";

/// Number of points per action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl ActionCounts {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Buy => self.buy += 1,
            Action::Sell => self.sell += 1,
            Action::Hold => self.hold += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.buy + self.sell + self.hold
    }
}

/// Derived analytics over one annotated series. Recomputed on every pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub max_price: f64,
    pub min_price: f64,
    pub first_price: f64,
    /// Percent change from the first to the latest price.
    pub change_pct: f64,
    pub latest: Option<AnnotatedPoint>,
    pub session_boundaries: Vec<DateTime<Utc>>,
    pub action_counts: ActionCounts,
}

impl SeriesSummary {
    pub fn empty() -> Self {
        Self {
            max_price: 0.0,
            min_price: 0.0,
            first_price: 0.0,
            change_pct: 0.0,
            latest: None,
            session_boundaries: Vec::new(),
            action_counts: ActionCounts::default(),
        }
    }
}

/// Summarize `points` in a single pass. Empty input gives [`SeriesSummary::empty`].
pub fn summarize(points: &[AnnotatedPoint], zone: ExchangeZone) -> SeriesSummary {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return SeriesSummary::empty();
    };

    let mut max_price = f64::NEG_INFINITY;
    let mut min_price = f64::INFINITY;
    let mut action_counts = ActionCounts::default();
    for p in points {
        max_price = max_price.max(p.price);
        min_price = min_price.min(p.price);
        action_counts.record(p.action);
    }

    let change_pct = if first.price != 0.0 {
        (last.price - first.price) / first.price * 100.0
    } else {
        0.0
    };

    SeriesSummary {
        max_price,
        min_price,
        first_price: first.price,
        change_pct,
        latest: Some(last.clone()),
        session_boundaries: session_boundaries(points, zone),
        action_counts,
    }
}

/// Times of the first point of each calendar day after the first.
///
/// Dates are taken in `zone`, so a point at 03:00 UTC belongs to the
/// previous day under UTC−5.
pub fn session_boundaries(points: &[AnnotatedPoint], zone: ExchangeZone) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    let mut prev: Option<NaiveDate> = None;
    for p in points {
        let date = calendar_date(p.time, zone);
        if prev.is_some_and(|d| d != date) {
            out.push(p.time);
        }
        prev = Some(date);
    }
    out
}

pub fn calendar_date(time: DateTime<Utc>, zone: ExchangeZone) -> NaiveDate {
    zone.local(time).date_naive()
}

/// `MM-dd HH:mm` in `zone`.
pub fn display_time(time: DateTime<Utc>, zone: ExchangeZone) -> String {
    zone.local(time).format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn utc5() -> ExchangeZone {
        ExchangeZone::fixed(FixedOffset::west_opt(5 * 3600).unwrap())
    }

    fn eastern() -> ExchangeZone {
        ExchangeZone::new(FixedOffset::west_opt(5 * 3600).unwrap(), true)
    }

    fn pt(y: i32, m: u32, d: u32, h: u32, min: u32, price: f64, action: Action) -> AnnotatedPoint {
        AnnotatedPoint {
            time: Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap(),
            price,
            action,
            score: 0.0,
            rationale: String::new(),
            matched: action != Action::Hold,
        }
    }

    #[test]
    fn empty_series_is_zeroed() {
        let s = summarize(&[], utc5());
        assert_eq!(s, SeriesSummary::empty());
        assert_eq!(s.max_price, 0.0);
        assert_eq!(s.min_price, 0.0);
        assert!(s.latest.is_none());
    }

    #[test]
    fn extrema_latest_and_change() {
        let points = vec![
            pt(2024, 3, 4, 15, 0, 10.0, Action::Hold),
            pt(2024, 3, 4, 15, 20, 12.5, Action::Buy),
            pt(2024, 3, 4, 15, 40, 9.0, Action::Sell),
            pt(2024, 3, 4, 16, 0, 11.0, Action::Hold),
        ];
        let s = summarize(&points, utc5());
        assert_eq!(s.max_price, 12.5);
        assert_eq!(s.min_price, 9.0);
        assert_eq!(s.first_price, 10.0);
        assert!((s.change_pct - 10.0).abs() < 1e-9);
        assert_eq!(s.latest.as_ref().unwrap().price, 11.0);
        assert_eq!(
            s.action_counts,
            ActionCounts {
                buy: 1,
                sell: 1,
                hold: 2
            }
        );
        assert_eq!(s.action_counts.total(), 4);
    }

    #[test]
    fn boundaries_on_date_change() {
        // D1, D1, D2, D2, D3 (market hours, UTC−5)
        let points = vec![
            pt(2024, 3, 4, 15, 0, 1.0, Action::Hold),
            pt(2024, 3, 4, 20, 0, 1.0, Action::Hold),
            pt(2024, 3, 5, 15, 0, 1.0, Action::Hold),
            pt(2024, 3, 5, 20, 0, 1.0, Action::Hold),
            pt(2024, 3, 6, 15, 0, 1.0, Action::Hold),
        ];
        let b = session_boundaries(&points, utc5());
        assert_eq!(b, vec![points[2].time, points[4].time]);
    }

    #[test]
    fn boundaries_use_display_offset() {
        // 23:00 UTC and 03:00 UTC next day are the same date under UTC−5.
        let points = vec![
            pt(2024, 3, 4, 23, 0, 1.0, Action::Hold),
            pt(2024, 3, 5, 3, 0, 1.0, Action::Hold),
        ];
        assert!(session_boundaries(&points, utc5()).is_empty());
        let utc = ExchangeZone::fixed(FixedOffset::east_opt(0).unwrap());
        assert_eq!(session_boundaries(&points, utc).len(), 1);
    }

    #[test]
    fn display_time_format() {
        let t = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(display_time(t, utc5()), "03-05 09:30");
    }

    #[test]
    fn summer_display_time_uses_daylight_offset() {
        let t = Utc.with_ymd_and_hms(2024, 7, 9, 13, 30, 0).unwrap();
        assert_eq!(display_time(t, eastern()), "07-09 09:30");
        assert_eq!(display_time(t, utc5()), "07-09 08:30");
    }

    #[test]
    fn boundaries_across_spring_forward() {
        // Fri 09:30 EST then Mon 09:30 EDT.
        let points = vec![
            pt(2024, 3, 8, 14, 30, 1.0, Action::Hold),
            pt(2024, 3, 8, 20, 50, 1.0, Action::Hold),
            pt(2024, 3, 11, 13, 30, 1.0, Action::Hold),
        ];
        assert_eq!(session_boundaries(&points, eastern()), vec![points[2].time]);
        assert_eq!(display_time(points[2].time, eastern()), "03-11 09:30");
    }
}
