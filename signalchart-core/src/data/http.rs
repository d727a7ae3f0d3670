//! Blocking JSON fetcher with retry, exponential backoff and circuit breaking.

use super::circuit_breaker::CircuitBreaker;
use super::provider::DataError;
use crate::config::SourcesConfig;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpFetcher {
    pub fn new(sources: &SourcesConfig, breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(sources.http_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Other(format!("build HTTP client: {e}")))?;
        Ok(Self {
            client,
            breaker,
            max_retries: sources.max_retries,
            base_delay: Duration::from_millis(sources.retry_base_delay_ms),
        })
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// GET `url` and decode the JSON body, retrying transient failures.
    ///
    /// 403 trips the breaker and aborts; 404 maps to `SymbolNotFound`; 429,
    /// other non-success statuses, timeouts and connect errors are retried.
    /// Only HTTP error responses count toward tripping the breaker; an
    /// unreachable host is reported as `NetworkUnreachable`.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str, symbol: &str) -> Result<T, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(backoff_delay(self.base_delay, attempt));
            }
            if !self.breaker.is_allowed() {
                // Tripped by this call's own failures: report what actually went wrong.
                return Err(last_error.take().unwrap_or(DataError::CircuitBreakerTripped));
            }

            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    tracing::debug!(%url, attempt, error = %e, "request failed, retrying");
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == StatusCode::FORBIDDEN {
                self.breaker.trip();
                tracing::warn!(%url, "HTTP 403, circuit breaker tripped");
                return Err(DataError::CircuitBreakerTripped);
            }
            if status == StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            if status == StatusCode::TOO_MANY_REQUESTS {
                self.breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if !status.is_success() {
                self.breaker.record_failure();
                last_error = Some(DataError::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
                continue;
            }

            let body: T = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!("decode response for {symbol}: {e}"))
            })?;
            self.breaker.record_success();
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt-1)`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
    }

    #[test]
    fn tripped_breaker_short_circuits() {
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(60)));
        breaker.trip();
        let fetcher = HttpFetcher::new(&SourcesConfig::default(), breaker).unwrap();
        let err = fetcher
            .get_json::<serde_json::Value>("http://127.0.0.1:9/never", "AAPL")
            .unwrap_err();
        assert!(matches!(err, DataError::CircuitBreakerTripped));
    }

    #[test]
    fn unreachable_host_reports_network_error_without_tripping() {
        let sources = SourcesConfig {
            max_retries: 3,
            retry_base_delay_ms: 1,
            http_timeout_secs: 2,
            ..SourcesConfig::default()
        };
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(60)));
        let fetcher = HttpFetcher::new(&sources, Arc::clone(&breaker)).unwrap();
        let err = fetcher
            .get_json::<serde_json::Value>("http://127.0.0.1:9/never", "AAPL")
            .unwrap_err();
        assert!(matches!(err, DataError::NetworkUnreachable(_)), "got {err:?}");
        assert!(breaker.is_allowed());
    }

    #[test]
    fn failures_that_trip_mid_call_report_last_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut buf = [0u8; 1024];
                let _ = std::io::Read::read(&mut stream, &mut buf);
                let _ = std::io::Write::write_all(
                    &mut stream,
                    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                );
            }
        });

        let sources = SourcesConfig {
            max_retries: 3,
            retry_base_delay_ms: 1,
            ..SourcesConfig::default()
        };
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(60)));
        let fetcher = HttpFetcher::new(&sources, Arc::clone(&breaker)).unwrap();
        let err = fetcher
            .get_json::<serde_json::Value>(&format!("http://127.0.0.1:{port}/chart"), "AAPL")
            .unwrap_err();
        assert!(matches!(err, DataError::Http { status: 500, .. }), "got {err:?}");
        assert!(!breaker.is_allowed());
    }
}
