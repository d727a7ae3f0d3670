//! Fetch-and-fuse service: load inputs, run fusion, build the payload.

use rayon::prelude::*;
use signalchart_core::config::{AppConfig, ConfigError};
use signalchart_core::data::{
    ChartApiPriceProvider, CircuitBreaker, DataError, FilePriceProvider, FileSignalProvider,
    PriceProvider, SignalApiProvider, SignalProvider,
};
use signalchart_core::fusion::fuse;
use signalchart_core::synthetic::SyntheticGenerator;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::loader::{load_inputs, LoadOptions};
use crate::payload::ChartPayload;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Where each input comes from. `None` means "not configured".
#[derive(Debug, Clone, Default)]
pub struct SourceSelection {
    /// Price file template (`{symbol}` expanded). Unset → chart API.
    pub price_file: Option<String>,
    /// Signal file template. Unset → signals endpoint from config, if any.
    pub signal_file: Option<String>,
    /// Skip the network entirely; only files (and synthetic fallback) are used.
    pub offline: bool,
}

/// Circuit breakers of the HTTP providers. Each host gets its own, so an
/// outage at one never blocks the other.
#[derive(Debug, Clone)]
pub struct SourceBreakers {
    pub prices: Arc<CircuitBreaker>,
    pub signals: Arc<CircuitBreaker>,
}

impl SourceBreakers {
    fn new(cooldown: Duration) -> Self {
        Self {
            prices: Arc::new(CircuitBreaker::new(cooldown)),
            signals: Arc::new(CircuitBreaker::new(cooldown)),
        }
    }
}

pub struct FusionService {
    config: AppConfig,
    prices: Option<Arc<dyn PriceProvider>>,
    signals: Option<Arc<dyn SignalProvider>>,
    generator: SyntheticGenerator,
    options: LoadOptions,
    breakers: Option<SourceBreakers>,
}

impl FusionService {
    pub fn new(
        config: AppConfig,
        prices: Option<Arc<dyn PriceProvider>>,
        signals: Option<Arc<dyn SignalProvider>>,
        options: LoadOptions,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let generator = SyntheticGenerator::new(config.synthetic.clone())?;
        Ok(Self {
            config,
            prices,
            signals,
            generator,
            options,
            breakers: None,
        })
    }

    /// Build providers from config and the selected sources. The chart API and
    /// the signals endpoint each get their own circuit breaker.
    pub fn from_sources(
        config: AppConfig,
        selection: &SourceSelection,
        options: LoadOptions,
    ) -> Result<Self, ServiceError> {
        let breakers = SourceBreakers::new(Duration::from_secs(
            config.sources.breaker_cooldown_secs,
        ));

        let prices: Option<Arc<dyn PriceProvider>> = match &selection.price_file {
            Some(template) => Some(Arc::new(FilePriceProvider::new(template.clone()))),
            None if selection.offline => None,
            None => Some(Arc::new(ChartApiPriceProvider::new(
                &config.sources,
                Arc::clone(&breakers.prices),
            )?)),
        };

        let signals: Option<Arc<dyn SignalProvider>> = match &selection.signal_file {
            Some(template) => Some(Arc::new(FileSignalProvider::new(template.clone()))),
            None if selection.offline => None,
            None => {
                SignalApiProvider::from_config(&config.sources, Arc::clone(&breakers.signals))?
                    .map(|p| Arc::new(p) as Arc<dyn SignalProvider>)
            }
        };

        let mut service = Self::new(config, prices, signals, options)?;
        service.breakers = Some(breakers);
        Ok(service)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Breakers created by [`FusionService::from_sources`]; `None` for injected providers.
    pub fn breakers(&self) -> Option<&SourceBreakers> {
        self.breakers.as_ref()
    }

    /// Run one full pass for `symbol`. Never fails: missing inputs give an empty
    /// or all-HOLD payload.
    pub fn run(&self, symbol: &str) -> ChartPayload {
        let loaded = load_inputs(
            symbol,
            self.prices.as_deref(),
            self.signals.as_deref(),
            &self.generator,
            &self.options,
        );
        let fused = fuse(
            &loaded.prices,
            &loaded.events,
            &self.config.fusion,
            &self.config.display,
        );
        tracing::debug!(
            symbol,
            points = fused.points.len(),
            events = loaded.events.len(),
            source = %loaded.price_source,
            "fusion pass complete"
        );
        let mut payload = ChartPayload::build(
            &loaded.symbol,
            loaded.price_source,
            loaded.signal_source,
            fused,
            self.config.display.zone(),
        );
        payload.synthetic_seed = loaded.synthetic_seed;
        payload
    }

    /// Run every symbol in parallel; output order matches `symbols`.
    pub fn run_many(&self, symbols: &[String]) -> Vec<ChartPayload> {
        symbols.par_iter().map(|s| self.run(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalchart_core::data::DataSource;
    use signalchart_core::rng::SeedPolicy;

    fn offline_synthetic() -> FusionService {
        let options = LoadOptions {
            synthetic_fallback: true,
            seed: SeedPolicy::Fixed(3),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 13),
        };
        let selection = SourceSelection {
            offline: true,
            ..SourceSelection::default()
        };
        FusionService::from_sources(AppConfig::default(), &selection, options).unwrap()
    }

    #[test]
    fn offline_without_files_uses_synthetic() {
        let payload = offline_synthetic().run("RGTI");
        assert_eq!(payload.source, DataSource::Synthetic);
        assert_eq!(payload.synthetic_seed, Some(3));
        assert_eq!(payload.rows.len(), 60);
        assert_eq!(payload.session_labels.len(), 2);
    }

    #[test]
    fn run_many_preserves_order() {
        let symbols = vec!["QBTS".to_string(), "RGTI".to_string(), "IONQ".to_string()];
        let payloads = offline_synthetic().run_many(&symbols);
        let got: Vec<_> = payloads.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(got, vec!["QBTS", "RGTI", "IONQ"]);
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.fusion.tolerance_secs = 0;
        let err = FusionService::new(config, None, None, LoadOptions::default());
        assert!(matches!(err, Err(ServiceError::Config(_))));
    }
}
