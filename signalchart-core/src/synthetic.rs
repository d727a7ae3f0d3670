//! Synthetic price and signal series for symbols with no real data.
//!
//! The generator is a pure function of `(symbol, end_date, seed)` plus its
//! config. Output has the loader shape (`Vec<PricePoint>`, `Vec<SignalEvent>`)
//! so it feeds the fusion pipeline unchanged.
//!
//! Prices follow a bounded random walk on a regular intraday schedule. Each
//! step also produces a pseudo-signal from an independent mock moving-average
//! perturbation, classified against a symmetric threshold.

use crate::config::{ConfigError, SyntheticConfig};
use crate::domain::{Action, PricePoint, SignalEvent};
use crate::rng::{hash_to_u64, SeedHierarchy, SeedPolicy};
use crate::zone::ExchangeZone;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use rand::Rng;
use serde::Serialize;

const MIN_PRICE: f64 = 0.01;
const SCORE_LIMIT: f64 = 100.0;

/// Output of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticSeries {
    pub symbol: String,
    pub prices: Vec<PricePoint>,
    pub events: Vec<SignalEvent>,
    /// Master seed actually used, for reproducing an `Entropy` run.
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    config: SyntheticConfig,
    open: NaiveTime,
    close: NaiveTime,
    zone: ExchangeZone,
}

impl SyntheticGenerator {
    pub fn new(config: SyntheticConfig) -> Result<Self, ConfigError> {
        let open = config.open_time()?;
        let close = config.close_time()?;
        if open >= close {
            return Err(ConfigError::Invalid(
                "synthetic session must open before it closes".into(),
            ));
        }
        if config.interval_mins == 0 {
            return Err(ConfigError::Invalid(
                "synthetic.interval_mins must be > 0".into(),
            ));
        }
        let zone = config.market_zone();
        Ok(Self {
            config,
            open,
            close,
            zone,
        })
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Starting price for `symbol`: configured override, else a stable hash in `[10, 500)`.
    pub fn starting_price(&self, symbol: &str) -> f64 {
        let key = symbol.trim().to_ascii_uppercase();
        if let Some(price) = self.config.start_prices.get(&key) {
            return *price;
        }
        let hash = hash_to_u64(&blake3::hash(key.as_bytes()));
        let unit = (hash >> 11) as f64 / (1u64 << 53) as f64;
        round_cents(10.0 + unit * 490.0)
    }

    /// The `days` most recent Mon–Fri dates strictly before `end_date`, ascending.
    pub fn session_days(&self, end_date: NaiveDate) -> Vec<NaiveDate> {
        let wanted = self.config.days as usize;
        let mut days = Vec::with_capacity(wanted);
        let mut cursor = end_date;
        while days.len() < wanted {
            let Some(prev) = cursor.pred_opt() else {
                break;
            };
            cursor = prev;
            if !matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
                days.push(cursor);
            }
        }
        days.reverse();
        days
    }

    /// Sampling instants for all session days, open to close inclusive.
    pub fn schedule(&self, end_date: NaiveDate) -> Vec<DateTime<Utc>> {
        let step = Duration::minutes(i64::from(self.config.interval_mins));
        let mut out = Vec::new();
        for day in self.session_days(end_date) {
            let Some(mut cursor) = self.market_instant(day, self.open) else {
                continue;
            };
            let Some(close) = self.market_instant(day, self.close) else {
                continue;
            };
            while cursor <= close {
                out.push(cursor);
                cursor += step;
            }
        }
        out
    }

    /// Generate the series for `symbol` ending before `end_date`.
    pub fn generate(&self, symbol: &str, end_date: NaiveDate, seed: &SeedPolicy) -> SyntheticSeries {
        let master = seed.resolve();
        let seeds = SeedHierarchy::new(master);
        let key = symbol.trim().to_ascii_uppercase();
        let mut walk = seeds.rng_for(&key, "price");
        let mut noise = seeds.rng_for(&key, "signal");

        let schedule = self.schedule(end_date);
        let mut prices = Vec::with_capacity(schedule.len());
        let mut events = Vec::with_capacity(schedule.len());
        let mut price = self.starting_price(&key);

        for time in schedule {
            let r: f64 = walk.gen();
            price += (r - 0.5) * 2.0 * self.config.max_step_pct * price;
            price = round_cents(price).max(MIN_PRICE);

            let r2: f64 = noise.gen();
            let mock_ma = price + (r2 - 0.5) * self.config.ma_band_pct * price;
            let score = round_cents(
                ((mock_ma - price) / price * self.config.score_gain).clamp(-SCORE_LIMIT, SCORE_LIMIT),
            );
            let action = classify_score(score, self.config.signal_threshold);

            prices.push(PricePoint::new(time, price));
            events.push(SignalEvent::new(
                time,
                action,
                score,
                self.rationale(action, score),
            ));
        }

        tracing::debug!(
            symbol = %key,
            seed = master,
            points = prices.len(),
            "generated synthetic series"
        );

        SyntheticSeries {
            symbol: key,
            prices,
            events,
            seed: master,
        }
    }

    fn rationale(&self, action: Action, score: f64) -> String {
        let threshold = self.config.signal_threshold;
        let cmp = match action {
            Action::Buy => format!("{score:.2} > {threshold:.2}"),
            Action::Sell => format!("{score:.2} < -{threshold:.2}"),
            Action::Hold => format!("|{score:.2}| <= {threshold:.2}"),
        };
        format!("Synthetic signal (mock MA spread): {cmp}")
    }

    fn market_instant(&self, day: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        self.zone
            .offset_on(day)
            .from_local_datetime(&day.and_time(time))
            .single()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// `score > threshold` → BUY, `score < -threshold` → SELL, else HOLD.
pub fn classify_score(score: f64, threshold: f64) -> Action {
    if score > threshold {
        Action::Buy
    } else if score < -threshold {
        Action::Sell
    } else {
        Action::Hold
    }
}

fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
