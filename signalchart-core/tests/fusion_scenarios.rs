//! End-to-end fusion scenarios: join → classify → summarize.

use chrono::{DateTime, Duration, TimeZone, Utc};
use signalchart_core::config::{DisplayConfig, FusionConfig};
use signalchart_core::domain::{Action, PricePoint, SignalEvent};
use signalchart_core::fusion::{fuse, DEFAULT_PLACEHOLDER};

fn origin() -> DateTime<Utc> {
    // 09:30 US Eastern (standard time)
    Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap()
}

fn at_min(min: i64) -> DateTime<Utc> {
    origin() + Duration::minutes(min)
}

fn four_points() -> Vec<PricePoint> {
    [(0, 10.00), (20, 10.05), (40, 9.98), (60, 10.10)]
        .iter()
        .map(|&(m, p)| PricePoint::new(at_min(m), p))
        .collect()
}

fn fusion_cfg(tolerance_secs: u64) -> FusionConfig {
    FusionConfig {
        tolerance_secs,
        ..FusionConfig::default()
    }
}

// ── Single BUY event near one point ──────────────────────────────────

#[test]
fn buy_event_annotates_nearest_point_only() {
    let events = vec![SignalEvent::new(at_min(19), Action::Buy, 42.0, "Breakout above VWAP")];
    let out = fuse(&four_points(), &events, &fusion_cfg(300), &DisplayConfig::default());

    assert_eq!(out.points.len(), 4);

    let hit = &out.points[1];
    assert_eq!(hit.action, Action::Buy);
    assert_eq!(hit.score, 42.0);
    assert_eq!(hit.rationale, "Breakout above VWAP");
    assert!(hit.matched);
    let values = hit.plot_values();
    assert_eq!(values.buy_value, Some(10.05));
    assert_eq!(values.sell_value, None);
    assert_eq!(values.hold_value, None);

    for idx in [0, 2, 3] {
        let p = &out.points[idx];
        assert_eq!(p.action, Action::Hold);
        assert_eq!(p.score, 0.0);
        assert_eq!(p.rationale, DEFAULT_PLACEHOLDER);
        assert!(!p.matched);
    }

    assert_eq!(out.summary.max_price, 10.10);
    assert_eq!(out.summary.min_price, 9.98);
    assert_eq!(out.summary.latest.as_ref().unwrap().price, 10.10);
    assert_eq!(out.summary.action_counts.buy, 1);
    assert_eq!(out.summary.action_counts.hold, 3);
}

// ── No signals at all ────────────────────────────────────────────────

#[test]
fn no_signals_gives_all_hold() {
    let prices = four_points();
    let out = fuse(&prices, &[], &fusion_cfg(300), &DisplayConfig::default());
    assert_eq!(out.points.len(), 4);
    for (p, src) in out.points.iter().zip(&prices) {
        assert_eq!(p.action, Action::Hold);
        let values = p.plot_values();
        assert_eq!(values.hold_value, Some(src.price));
        assert!(values.buy_value.is_none());
        assert!(values.sell_value.is_none());
    }
}

// ── Equidistant events ───────────────────────────────────────────────

#[test]
fn equidistant_events_resolve_to_earliest() {
    let base = origin();
    let prices = vec![PricePoint::new(base + Duration::seconds(100), 5.0)];
    let events = vec![
        SignalEvent::new(base + Duration::seconds(103), Action::Buy, 30.0, "late"),
        SignalEvent::new(base + Duration::seconds(97), Action::Sell, -30.0, "early"),
    ];
    let out = fuse(&prices, &events, &fusion_cfg(10), &DisplayConfig::default());
    assert_eq!(out.points[0].action, Action::Sell);
    assert_eq!(out.points[0].rationale, "early");
    assert_eq!(out.points[0].plot_values().sell_value, Some(5.0));
}

// ── Nearest of two candidates ────────────────────────────────────────

#[test]
fn nearer_event_wins() {
    let prices = vec![PricePoint::new(at_min(20), 10.0)];
    let events = vec![
        SignalEvent::new(at_min(24), Action::Sell, -50.0, "d2"),
        SignalEvent::new(at_min(21), Action::Buy, 50.0, "d1"),
    ];
    let out = fuse(&prices, &events, &fusion_cfg(300), &DisplayConfig::default());
    assert_eq!(out.points[0].rationale, "d1");
    assert_eq!(out.points[0].score, 50.0);
}

// ── Missing inputs ───────────────────────────────────────────────────

#[test]
fn empty_prices_give_empty_series() {
    let events = vec![SignalEvent::new(at_min(0), Action::Buy, 10.0, "orphan")];
    let out = fuse(&[], &events, &fusion_cfg(300), &DisplayConfig::default());
    assert!(out.points.is_empty());
    assert_eq!(out.summary.max_price, 0.0);
    assert_eq!(out.summary.min_price, 0.0);
    assert!(out.summary.latest.is_none());
    assert!(out.summary.session_boundaries.is_empty());
}

// ── Session boundaries over three days ───────────────────────────────

#[test]
fn three_days_give_two_boundaries() {
    let day = Duration::days(1);
    let prices = vec![
        PricePoint::new(origin(), 1.0),
        PricePoint::new(origin() + Duration::hours(6), 1.1),
        PricePoint::new(origin() + day, 1.2),
        PricePoint::new(origin() + day + Duration::hours(6), 1.3),
        PricePoint::new(origin() + day * 2, 1.4),
    ];
    let out = fuse(&prices, &[], &fusion_cfg(300), &DisplayConfig::default());
    assert_eq!(
        out.summary.session_boundaries,
        vec![prices[2].time, prices[4].time]
    );
}

// ── Custom placeholder flows through ─────────────────────────────────

#[test]
fn configured_placeholder_is_used() {
    let cfg = FusionConfig {
        tolerance_secs: 60,
        placeholder_reason: "Awaiting analysis".into(),
    };
    let out = fuse(&four_points(), &[], &cfg, &DisplayConfig::default());
    assert!(out.points.iter().all(|p| p.rationale == "Awaiting analysis"));
}
