//! Loader traits and structured error types.

use crate::domain::{PricePoint, SignalEvent};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid symbol {0:?}")]
    InvalidSymbol(String),

    #[error("hard stop: provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Provenance of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    ChartApi,
    SignalApi,
    File,
    Synthetic,
    /// Nothing was loaded (fetch failed or no provider configured).
    None,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataSource::ChartApi => "chart-api",
            DataSource::SignalApi => "signal-api",
            DataSource::File => "file",
            DataSource::Synthetic => "synthetic",
            DataSource::None => "none",
        };
        f.write_str(s)
    }
}

/// Loads a symbol's price history, ascending by time with unique times.
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError>;
}

/// Loads a symbol's decision events, in any order.
pub trait SignalProvider: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch_signals(&self, symbol: &str) -> Result<Vec<SignalEvent>, DataError>;
}
