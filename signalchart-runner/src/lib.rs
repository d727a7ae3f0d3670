//! SignalChart Runner: fetch-and-fuse orchestration.
//!
//! This crate builds on `signalchart-core` to provide:
//! - Concurrent loading of prices and signals with failure-to-empty fallback
//! - Synthetic fallback for symbols with no real prices
//! - `FusionService`: one pass from providers to renderer payload
//! - `ChartSession`: last-completed-wins publication of refresh passes
//! - `ChartPayload`: the renderer JSON contract

pub mod loader;
pub mod payload;
pub mod pipeline;
pub mod session;

pub use loader::{load_inputs, LoadOptions, LoadedInputs};
pub use payload::{ChartPayload, ChartRow};
pub use pipeline::{FusionService, ServiceError, SourceBreakers, SourceSelection};
pub use session::{ChartSession, PassOutcome};
