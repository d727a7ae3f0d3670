//! Temporal join: attach at most one signal event to each price point.
//!
//! An event matches a point iff `|event.time − point.time| < tolerance`.
//! Matching is one-to-one and resolved nearest-first over all candidate
//! pairs, ordered by `(distance, event time, point index)`:
//! - a point takes the nearest event still available,
//! - equidistant events resolve to the earliest event time,
//! - an event is consumed by its nearest point and never reused.
//!
//! The ordering is total, so equal inputs always produce equal output.

use crate::domain::{PricePoint, SignalEvent};

/// A price point and the event the join attached to it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Joined {
    pub point: PricePoint,
    pub event: Option<SignalEvent>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance_ms: i64,
    event_ms: i64,
    point: usize,
    slot: usize,
}

/// Join `prices` (ascending) with `events` (any order) inside `tolerance_ms`.
///
/// Output has the same length and order as `prices`.
pub fn join(prices: &[PricePoint], events: &[SignalEvent], tolerance_ms: i64) -> Vec<Joined> {
    if events.is_empty() || tolerance_ms <= 0 {
        return prices
            .iter()
            .map(|p| Joined {
                point: *p,
                event: None,
            })
            .collect();
    }

    // Event slots sorted by time; the stable sort keeps input order for equal times.
    let mut order: Vec<usize> = (0..events.len()).collect();
    order.sort_by_key(|&i| events[i].time_ms());
    let event_ms: Vec<i64> = order.iter().map(|&i| events[i].time_ms()).collect();

    let mut candidates = Vec::new();
    for (point_idx, point) in prices.iter().enumerate() {
        let t = point.time_ms();
        let lo = event_ms.partition_point(|&e| e <= t.saturating_sub(tolerance_ms));
        let hi = event_ms.partition_point(|&e| e < t.saturating_add(tolerance_ms));
        for slot in lo..hi {
            candidates.push(Candidate {
                distance_ms: (event_ms[slot] - t).abs(),
                event_ms: event_ms[slot],
                point: point_idx,
                slot,
            });
        }
    }

    candidates.sort_by(|a, b| {
        a.distance_ms
            .cmp(&b.distance_ms)
            .then(a.event_ms.cmp(&b.event_ms))
            .then(a.point.cmp(&b.point))
            .then(a.slot.cmp(&b.slot))
    });

    let mut assigned: Vec<Option<usize>> = vec![None; prices.len()];
    let mut consumed = vec![false; event_ms.len()];
    for c in &candidates {
        if assigned[c.point].is_none() && !consumed[c.slot] {
            assigned[c.point] = Some(c.slot);
            consumed[c.slot] = true;
        }
    }

    let matched = assigned.iter().filter(|a| a.is_some()).count();
    tracing::debug!(
        points = prices.len(),
        events = events.len(),
        candidates = candidates.len(),
        matched,
        "temporal join complete"
    );

    prices
        .iter()
        .zip(assigned)
        .map(|(point, slot)| Joined {
            point: *point,
            event: slot.map(|s| events[order[s]].clone()),
        })
        .collect()
}
