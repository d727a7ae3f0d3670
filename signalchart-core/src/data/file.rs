//! File-backed loaders.
//!
//! Paths may contain `{symbol}`, replaced by the requested symbol, so one
//! template serves a whole watchlist (`data/{symbol}.csv`). Price files are
//! CSV (`time,price` header) or a JSON array of price records; signal files
//! are a JSON array of signal records.

use super::provider::{DataError, DataSource, PriceProvider, SignalProvider};
use super::wire::{events_from_wire, prices_from_wire, PriceRecord, SignalRecord};
use crate::domain::{PricePoint, SignalEvent};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// Expand `{symbol}`. Symbols that could leave the template's directory are rejected.
fn resolve(template: &str, symbol: &str) -> Result<PathBuf, DataError> {
    let escapes = symbol.is_empty()
        || symbol.contains("..")
        || symbol.chars().any(|c| matches!(c, '/' | '\\' | ':') || c.is_control());
    if template.contains(SYMBOL_PLACEHOLDER) && escapes {
        return Err(DataError::InvalidSymbol(symbol.to_string()));
    }
    Ok(PathBuf::from(template.replace(SYMBOL_PLACEHOLDER, symbol)))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| DataError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn read_price_csv(path: &Path) -> Result<Vec<PriceRecord>, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    reader
        .deserialize::<PriceRecord>()
        .map(|row| row.map_err(|e| csv_error(path, e)))
        .collect()
}

fn csv_error(path: &Path, err: csv::Error) -> DataError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => DataError::Io {
            path: path.to_path_buf(),
            source,
        },
        _ => DataError::Parse {
            path: path.to_path_buf(),
            reason,
        },
    }
}

pub struct FilePriceProvider {
    template: String,
}

impl FilePriceProvider {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> Result<PathBuf, DataError> {
        resolve(&self.template, symbol)
    }
}

impl PriceProvider for FilePriceProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn source(&self) -> DataSource {
        DataSource::File
    }

    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError> {
        let path = self.path_for(symbol)?;
        let records = if is_csv(&path) {
            read_price_csv(&path)?
        } else {
            read_json_array(&path)?
        };
        Ok(prices_from_wire(records))
    }
}

pub struct FileSignalProvider {
    template: String,
}

impl FileSignalProvider {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> Result<PathBuf, DataError> {
        resolve(&self.template, symbol)
    }
}

impl SignalProvider for FileSignalProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn source(&self) -> DataSource {
        DataSource::File
    }

    fn fetch_signals(&self, symbol: &str) -> Result<Vec<SignalEvent>, DataError> {
        let records: Vec<SignalRecord> = read_json_array(&self.path_for(symbol)?)?;
        Ok(events_from_wire(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action;
    use std::fs;

    #[test]
    fn symbol_template_is_expanded() {
        let p = FilePriceProvider::new("data/{symbol}.csv");
        assert_eq!(p.path_for("RGTI").unwrap(), PathBuf::from("data/RGTI.csv"));
    }

    #[test]
    fn symbols_cannot_escape_template_directory() {
        let p = FilePriceProvider::new("data/{symbol}.csv");
        for bad in ["../secrets", "a/b", "..", "C:\\x", ""] {
            assert!(
                matches!(p.path_for(bad), Err(DataError::InvalidSymbol(_))),
                "{bad:?} accepted"
            );
        }
        assert!(matches!(
            p.fetch_prices("../../etc/passwd").unwrap_err(),
            DataError::InvalidSymbol(_)
        ));
        assert_eq!(p.path_for("BRK.B").unwrap(), PathBuf::from("data/BRK.B.csv"));
    }

    #[test]
    fn reads_price_csv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("RGTI.csv"),
            "time,price\n1709564400000,1.55\n1709563200000,1.50\n",
        )
        .unwrap();
        let template = dir.path().join("{symbol}.csv");
        let provider = FilePriceProvider::new(template.to_string_lossy());
        let prices = provider.fetch_prices("RGTI").unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].price, 1.50);
    }

    #[test]
    fn reads_price_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        fs::write(&path, r#"[{"time": 1000, "price": 2.0}]"#).unwrap();
        let provider = FilePriceProvider::new(path.to_string_lossy());
        assert_eq!(provider.fetch_prices("ANY").unwrap().len(), 1);
    }

    #[test]
    fn reads_signal_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("QBTS-signals.json");
        fs::write(
            &path,
            r#"[{"timestamp": 1000, "action": "SELL", "signal_score": "-40", "reason": "overbought"}]"#,
        )
        .unwrap();
        let template = dir.path().join("{symbol}-signals.json");
        let provider = FileSignalProvider::new(template.to_string_lossy());
        let events = provider.fetch_signals("QBTS").unwrap();
        assert_eq!(events[0].action, Action::Sell);
        assert_eq!(events[0].score, -40.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileSignalProvider::new(dir.path().join("none.json").to_string_lossy());
        assert!(matches!(
            provider.fetch_signals("X").unwrap_err(),
            DataError::Io { .. }
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let provider = FilePriceProvider::new(path.to_string_lossy());
        assert!(matches!(
            provider.fetch_prices("X").unwrap_err(),
            DataError::Parse { .. }
        ));
    }
}
