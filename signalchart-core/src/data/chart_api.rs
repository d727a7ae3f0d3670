//! Intraday price loader for a Yahoo-v8 style chart endpoint.
//!
//! `GET {price_api_url}/{SYMBOL}?interval=15m&range=5d` returns parallel
//! arrays of epoch-second timestamps and quote closes; null closes (halts,
//! pre-market gaps) are skipped.

use super::circuit_breaker::CircuitBreaker;
use super::http::HttpFetcher;
use super::provider::{DataError, DataSource, PriceProvider};
use super::wire::{prices_from_wire, PriceRecord};
use crate::config::SourcesConfig;
use crate::domain::PricePoint;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

pub struct ChartApiPriceProvider {
    http: HttpFetcher,
    base_url: String,
    interval: String,
    range: String,
}

impl ChartApiPriceProvider {
    pub fn new(sources: &SourcesConfig, breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Ok(Self {
            http: HttpFetcher::new(sources, breaker)?,
            base_url: sources.price_api_url.trim_end_matches('/').to_string(),
            interval: sources.price_interval.clone(),
            range: sources.price_range.clone(),
        })
    }

    pub fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/{symbol}?interval={}&range={}",
            self.base_url, self.interval, self.range
        )
    }
}

fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PricePoint>, DataError> {
    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormatChanged("empty result with no error".into()),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

    // A valid symbol with no trades in range has no timestamp array.
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    if quote.close.len() != timestamps.len() {
        return Err(DataError::ResponseFormatChanged(format!(
            "{} timestamps but {} closes",
            timestamps.len(),
            quote.close.len()
        )));
    }

    let records = timestamps
        .iter()
        .zip(quote.close)
        .filter_map(|(&ts, close)| {
            close.map(|price| PriceRecord {
                time: ts.saturating_mul(1000),
                price,
            })
        })
        .collect();
    Ok(prices_from_wire(records))
}

impl PriceProvider for ChartApiPriceProvider {
    fn name(&self) -> &str {
        "chart_api"
    }

    fn source(&self) -> DataSource {
        DataSource::ChartApi
    }

    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError> {
        let url = self.chart_url(symbol);
        let resp: ChartResponse = self.http.get_json(&url, symbol)?;
        let prices = parse_response(symbol, resp)?;
        tracing::debug!(symbol, points = prices.len(), "fetched chart prices");
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(json: &str) -> Result<Vec<PricePoint>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        parse_response("RGTI", resp)
    }

    #[test]
    fn parses_closes_and_skips_nulls() {
        let prices = parse(
            r#"{"chart":{"result":[{"timestamp":[1709562600,1709563500,1709564400],
                "indicators":{"quote":[{"close":[1.52,null,1.55]}]}}],"error":null}}"#,
        )
        .unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].time_ms(), 1_709_562_600_000);
        assert_eq!(prices[1].price, 1.55);
    }

    #[test]
    fn not_found_maps_to_symbol_error() {
        let err = parse(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn mismatched_arrays_rejected() {
        let err = parse(
            r#"{"chart":{"result":[{"timestamp":[1,2],"indicators":{"quote":[{"close":[1.0]}]}}],"error":null}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn url_shape() {
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(1)));
        let provider = ChartApiPriceProvider::new(&SourcesConfig::default(), breaker).unwrap();
        assert_eq!(
            provider.chart_url("QBTS"),
            "https://query2.finance.yahoo.com/v8/finance/chart/QBTS?interval=15m&range=5d"
        );
    }
}
