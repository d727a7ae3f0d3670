//! Signal loader for the dashboard's signals route.
//!
//! `GET {signal_api_url}?symbol=SYM` returns a JSON array of signal records
//! (`timestamp`, `action`, `reason`, `signal_score`).

use super::circuit_breaker::CircuitBreaker;
use super::http::HttpFetcher;
use super::provider::{DataError, DataSource, SignalProvider};
use super::wire::{events_from_wire, SignalRecord};
use crate::config::SourcesConfig;
use crate::domain::SignalEvent;
use std::sync::Arc;

pub struct SignalApiProvider {
    http: HttpFetcher,
    base_url: String,
}

impl SignalApiProvider {
    pub fn new(
        base_url: impl Into<String>,
        sources: &SourcesConfig,
        breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            http: HttpFetcher::new(sources, breaker)?,
            base_url: base_url.into(),
        })
    }

    /// `None` when no signals endpoint is configured.
    pub fn from_config(
        sources: &SourcesConfig,
        breaker: Arc<CircuitBreaker>,
    ) -> Result<Option<Self>, DataError> {
        match sources.signal_api_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(Some(Self::new(url.trim(), sources, breaker)?)),
            _ => Ok(None),
        }
    }

    pub fn signals_url(&self, symbol: &str) -> String {
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{sep}symbol={symbol}", self.base_url)
    }
}

impl SignalProvider for SignalApiProvider {
    fn name(&self) -> &str {
        "signal_api"
    }

    fn source(&self) -> DataSource {
        DataSource::SignalApi
    }

    fn fetch_signals(&self, symbol: &str) -> Result<Vec<SignalEvent>, DataError> {
        let url = self.signals_url(symbol);
        let records: Vec<SignalRecord> = self.http.get_json(&url, symbol)?;
        let events = events_from_wire(records);
        tracing::debug!(symbol, events = events.len(), "fetched signals");
        Ok(events)
    }
}
