//! Price and signal loaders.
//!
//! Both loaders sit behind small traits so the runner can swap HTTP, file and
//! mock implementations. Wire records are normalized into domain types here;
//! the fusion core never sees raw JSON.

pub mod chart_api;
pub mod circuit_breaker;
pub mod file;
pub mod http;
pub mod provider;
pub mod signal_api;
pub mod wire;

pub use chart_api::ChartApiPriceProvider;
pub use circuit_breaker::CircuitBreaker;
pub use file::{FilePriceProvider, FileSignalProvider};
pub use http::HttpFetcher;
pub use provider::{DataError, DataSource, PriceProvider, SignalProvider};
pub use signal_api::SignalApiProvider;
pub use wire::{events_from_wire, prices_from_wire, PriceRecord, SignalRecord};
