//! Input loading for one fusion pass.
//!
//! Prices and signals are fetched concurrently. Fallback policy:
//! 1. Price fetch fails or returns nothing → empty prices (no chart)
//! 2. Signal fetch fails → empty events (every point HOLD)
//! 3. No prices and synthetic fallback enabled → generated prices and signals (tagged)
//!
//! Failures are logged and never abort the pass.

use chrono::{NaiveDate, Utc};
use signalchart_core::data::{DataSource, PriceProvider, SignalProvider};
use signalchart_core::domain::{PricePoint, SignalEvent};
use signalchart_core::rng::SeedPolicy;
use signalchart_core::synthetic::SyntheticGenerator;

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Generate a synthetic series when no real prices are available.
    pub synthetic_fallback: bool,
    pub seed: SeedPolicy,
    /// Synthetic sessions end strictly before this date; `None` means today (UTC).
    pub end_date: Option<NaiveDate>,
}

impl LoadOptions {
    pub fn resolved_end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Inputs for one symbol, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub symbol: String,
    pub prices: Vec<PricePoint>,
    pub events: Vec<SignalEvent>,
    pub price_source: DataSource,
    pub signal_source: DataSource,
    /// Master seed when the series is synthetic.
    pub synthetic_seed: Option<u64>,
}

impl LoadedInputs {
    pub fn is_synthetic(&self) -> bool {
        self.price_source == DataSource::Synthetic
    }
}

/// Load prices and signals for `symbol`, applying the fallback policy.
pub fn load_inputs(
    symbol: &str,
    prices: Option<&dyn PriceProvider>,
    signals: Option<&dyn SignalProvider>,
    generator: &SyntheticGenerator,
    opts: &LoadOptions,
) -> LoadedInputs {
    let (price_result, signal_result) = rayon::join(
        || fetch_prices(symbol, prices),
        || fetch_signals(symbol, signals),
    );
    let (prices, price_source) = price_result;
    let (events, signal_source) = signal_result;

    if prices.is_empty() && opts.synthetic_fallback {
        tracing::warn!(
            symbol,
            "no real prices, generating synthetic series (results tagged synthetic)"
        );
        let series = generator.generate(symbol, opts.resolved_end_date(), &opts.seed);
        return LoadedInputs {
            symbol: symbol.to_string(),
            prices: series.prices,
            events: series.events,
            price_source: DataSource::Synthetic,
            signal_source: DataSource::Synthetic,
            synthetic_seed: Some(series.seed),
        };
    }

    LoadedInputs {
        symbol: symbol.to_string(),
        prices,
        events,
        price_source,
        signal_source,
        synthetic_seed: None,
    }
}

fn fetch_prices(symbol: &str, provider: Option<&dyn PriceProvider>) -> (Vec<PricePoint>, DataSource) {
    let Some(provider) = provider else {
        return (Vec::new(), DataSource::None);
    };
    match provider.fetch_prices(symbol) {
        Ok(prices) => (prices, provider.source()),
        Err(e) => {
            tracing::warn!(symbol, provider = provider.name(), error = %e, "price fetch failed");
            (Vec::new(), DataSource::None)
        }
    }
}

fn fetch_signals(symbol: &str, provider: Option<&dyn SignalProvider>) -> (Vec<SignalEvent>, DataSource) {
    let Some(provider) = provider else {
        return (Vec::new(), DataSource::None);
    };
    match provider.fetch_signals(symbol) {
        Ok(events) => (events, provider.source()),
        Err(e) => {
            tracing::warn!(symbol, provider = provider.name(), error = %e, "signal fetch failed");
            (Vec::new(), DataSource::None)
        }
    }
}
