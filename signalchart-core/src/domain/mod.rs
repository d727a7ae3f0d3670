//! Domain types for SignalChart

pub mod annotated;
pub mod price;
pub mod signal;

pub use annotated::{AnnotatedPoint, PlotChannel, PlotValues};
pub use price::PricePoint;
pub use signal::{Action, SignalEvent, UnknownAction};

/// Symbol type alias
pub type Symbol = String;
