//! Application configuration.
//!
//! Loaded from a TOML file with four sections: `[fusion]`, `[display]`,
//! `[synthetic]` and `[sources]`. Every field has a default, so an empty
//! file (or no file at all) yields a working configuration.

use chrono::{FixedOffset, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fusion::classify::DEFAULT_PLACEHOLDER;
use crate::zone::ExchangeZone;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fusion: FusionConfig,
    pub display: DisplayConfig,
    pub synthetic: SyntheticConfig,
    pub sources: SourcesConfig,
}

impl AppConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fusion.validate()?;
        self.display.validate()?;
        self.synthetic.validate()?;
        self.sources.validate()
    }
}

/// Temporal join and classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Tolerance window: an event matches a point iff `|Δt| < tolerance`.
    pub tolerance_secs: u64,
    /// Rationale attached to points with no matching event.
    pub placeholder_reason: String,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            tolerance_secs: 300,
            placeholder_reason: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl FusionConfig {
    pub fn tolerance_ms(&self) -> i64 {
        i64::try_from(self.tolerance_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_secs == 0 {
            return Err(ConfigError::Invalid(
                "fusion.tolerance_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// How times are shown and which calendar day a point belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Standard-time offset from UTC in minutes used for display labels and session days.
    pub utc_offset_mins: i32,
    /// Shift by one hour during US daylight saving time.
    pub us_daylight_saving: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        // US Eastern.
        Self {
            utc_offset_mins: -300,
            us_daylight_saving: true,
        }
    }
}

impl DisplayConfig {
    pub fn zone(&self) -> ExchangeZone {
        ExchangeZone::new(offset_from_mins(self.utc_offset_mins), self.us_daylight_saving)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_offset("display.utc_offset_mins", self.utc_offset_mins)
    }
}

/// Fallback synthetic series settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Minutes between generated points.
    pub interval_mins: u32,
    /// Session open, `HH:MM` in the market offset.
    pub session_open: String,
    /// Session close (inclusive), `HH:MM` in the market offset.
    pub session_close: String,
    /// Number of trailing business days to generate.
    pub days: u32,
    /// Maximum random-walk step as a fraction of the current price.
    pub max_step_pct: f64,
    /// Width of the mock moving-average perturbation, as a fraction of price.
    pub ma_band_pct: f64,
    /// Scales the relative perturbation into the score range.
    pub score_gain: f64,
    /// `score > threshold` → BUY, `score < -threshold` → SELL.
    pub signal_threshold: f64,
    /// Exchange standard-time offset from UTC in minutes.
    pub market_utc_offset_mins: i32,
    /// Exchange observes US daylight saving time.
    pub market_us_daylight_saving: bool,
    /// Fixed starting prices for known symbols.
    pub start_prices: BTreeMap<String, f64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        let mut start_prices = BTreeMap::new();
        start_prices.insert("RGTI".to_string(), 1.5);
        start_prices.insert("QBTS".to_string(), 2.3);
        Self {
            interval_mins: 20,
            session_open: "09:30".into(),
            session_close: "16:00".into(),
            days: 3,
            max_step_pct: 0.01,
            ma_band_pct: 0.05,
            score_gain: 1000.0,
            signal_threshold: 15.0,
            market_utc_offset_mins: -300,
            market_us_daylight_saving: true,
            start_prices,
        }
    }
}

impl SyntheticConfig {
    pub fn open_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_hhmm("synthetic.session_open", &self.session_open)
    }

    pub fn close_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_hhmm("synthetic.session_close", &self.session_close)
    }

    pub fn market_zone(&self) -> ExchangeZone {
        ExchangeZone::new(
            offset_from_mins(self.market_utc_offset_mins),
            self.market_us_daylight_saving,
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_mins == 0 {
            return Err(ConfigError::Invalid(
                "synthetic.interval_mins must be > 0".into(),
            ));
        }
        if self.days == 0 {
            return Err(ConfigError::Invalid("synthetic.days must be > 0".into()));
        }
        if self.open_time()? >= self.close_time()? {
            return Err(ConfigError::Invalid(format!(
                "synthetic.session_open ({}) must be before session_close ({})",
                self.session_open, self.session_close
            )));
        }
        if !self.max_step_pct.is_finite() || self.max_step_pct <= 0.0 || self.max_step_pct >= 1.0 {
            return Err(ConfigError::Invalid(
                "synthetic.max_step_pct must be in (0, 1)".into(),
            ));
        }
        if !self.ma_band_pct.is_finite() || self.ma_band_pct < 0.0 {
            return Err(ConfigError::Invalid(
                "synthetic.ma_band_pct must be finite and >= 0".into(),
            ));
        }
        if !self.signal_threshold.is_finite() || self.signal_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "synthetic.signal_threshold must be finite and >= 0".into(),
            ));
        }
        if let Some((sym, price)) = self.start_prices.iter().find(|(_, p)| !p.is_finite() || **p <= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "synthetic.start_prices.{sym} must be > 0 (got {price})"
            )));
        }
        check_offset("synthetic.market_utc_offset_mins", self.market_utc_offset_mins)
    }
}

/// Remote price and signal endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Chart API base; the symbol is appended as a path segment.
    pub price_api_url: String,
    /// Intraday bar interval requested from the chart API.
    pub price_interval: String,
    /// Lookback window requested from the chart API.
    pub price_range: String,
    /// Signals endpoint (`?symbol=` is appended). Unset means no signal store.
    pub signal_api_url: Option<String>,
    pub http_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub breaker_cooldown_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            price_api_url: "https://query2.finance.yahoo.com/v8/finance/chart".into(),
            price_interval: "15m".into(),
            price_range: "5d".into(),
            signal_api_url: None,
            http_timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
            breaker_cooldown_secs: 30 * 60,
        }
    }
}

impl SourcesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.price_api_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sources.price_api_url must not be empty".into(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "sources.http_timeout_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

fn parse_hhmm(key: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| ConfigError::Invalid(format!("{key} '{value}' is not HH:MM: {e}")))
}

fn check_offset(key: &str, mins: i32) -> Result<(), ConfigError> {
    if FixedOffset::east_opt(mins.saturating_mul(60)).is_none() {
        return Err(ConfigError::Invalid(format!(
            "{key} = {mins} is outside ±24h"
        )));
    }
    Ok(())
}

fn offset_from_mins(mins: i32) -> FixedOffset {
    FixedOffset::east_opt(mins.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}
