//! Chart sessions with last-completed-wins publication.
//!
//! Every refresh request takes a new generation number. When a pass completes
//! it publishes only if no newer request was issued while it ran; otherwise
//! its result is dropped and reported as [`PassOutcome::Superseded`]. The
//! published slot therefore never regresses to an older request's data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::payload::ChartPayload;
use crate::pipeline::FusionService;

#[derive(Debug, Clone)]
pub enum PassOutcome {
    Published {
        generation: u64,
        payload: Arc<ChartPayload>,
    },
    /// A newer request was issued before this pass finished.
    Superseded { generation: u64, latest: u64 },
}

impl PassOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PassOutcome::Published { .. })
    }

    pub fn generation(&self) -> u64 {
        match self {
            PassOutcome::Published { generation, .. } | PassOutcome::Superseded { generation, .. } => {
                *generation
            }
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    payload: Option<Arc<ChartPayload>>,
}

pub struct ChartSession {
    service: Arc<FusionService>,
    requested: AtomicU64,
    published: Mutex<Slot>,
}

impl ChartSession {
    pub fn new(service: Arc<FusionService>) -> Self {
        Self {
            service,
            requested: AtomicU64::new(0),
            published: Mutex::new(Slot::default()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Most recent published payload, if any pass has published yet.
    pub fn current(&self) -> Option<Arc<ChartPayload>> {
        self.slot().payload.clone()
    }

    /// Generation of the most recent request.
    pub fn latest_generation(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    /// Run a pass for `symbol` on the calling thread.
    pub fn refresh(&self, symbol: &str) -> PassOutcome {
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let payload = self.service.run(symbol);
        self.publish(generation, payload)
    }

    /// Run a pass on a background thread. The generation is taken before the
    /// thread starts, so request order is the caller's call order.
    pub fn refresh_in_background(self: &Arc<Self>, symbol: impl Into<String>) -> JoinHandle<PassOutcome> {
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Arc::clone(self);
        let symbol = symbol.into();
        thread::spawn(move || {
            let payload = session.service.run(&symbol);
            session.publish(generation, payload)
        })
    }

    fn publish(&self, generation: u64, payload: ChartPayload) -> PassOutcome {
        let mut slot = self.slot();
        let latest = self.requested.load(Ordering::SeqCst);
        if generation != latest || generation <= slot.generation {
            tracing::debug!(
                symbol = %payload.symbol,
                generation,
                latest,
                "discarding superseded fusion pass"
            );
            return PassOutcome::Superseded { generation, latest };
        }
        let payload = Arc::new(payload);
        slot.generation = generation;
        slot.payload = Some(Arc::clone(&payload));
        tracing::info!(
            symbol = %payload.symbol,
            generation,
            rows = payload.rows.len(),
            source = %payload.source,
            "published chart"
        );
        PassOutcome::Published {
            generation,
            payload,
        }
    }
}
