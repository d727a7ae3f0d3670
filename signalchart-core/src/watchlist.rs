//! Watchlist: the user's tracked symbols, stored as TOML.
//!
//! ```toml
//! [[entries]]
//! symbol = "RGTI"
//! name = "Rigetti Computing"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAX_SYMBOL_LEN: usize = 20;
pub const DEFAULT_NAME: &str = "Custom Stock";

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("read watchlist {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write watchlist {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse watchlist TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize watchlist: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    #[serde(default)]
    pub entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    /// The list a fresh install starts with.
    pub fn seeded() -> Self {
        let entries = [
            ("RGTI", "Rigetti Computing"),
            ("QBTS", "D-Wave Quantum"),
            ("IONQ", "IonQ Inc"),
        ]
        .into_iter()
        .map(|(symbol, name)| WatchlistEntry {
            symbol: symbol.into(),
            name: name.into(),
        })
        .collect();
        Self { entries }
    }

    pub fn from_toml(content: &str) -> Result<Self, WatchlistError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, WatchlistError> {
        let content = std::fs::read_to_string(path).map_err(|source| WatchlistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path`, or the seeded list if the file does not exist yet.
    pub fn load_or_seed(path: &Path) -> Result<Self, WatchlistError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::seeded())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), WatchlistError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source: std::io::Error| WatchlistError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)
    }

    /// Add a symbol. Returns `false` if it was already present.
    pub fn add(&mut self, symbol: &str, name: Option<&str>) -> Result<bool, WatchlistError> {
        let symbol = normalize_symbol(symbol)?;
        if self.contains(&symbol) {
            return Ok(false);
        }
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NAME);
        self.entries.push(WatchlistEntry {
            symbol,
            name: name.to_string(),
        });
        Ok(true)
    }

    /// Remove a symbol (case-insensitive). Returns whether it was present.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let before = self.entries.len();
        let wanted = symbol.trim();
        self.entries.retain(|e| !e.symbol.eq_ignore_ascii_case(wanted));
        self.entries.len() != before
    }

    pub fn contains(&self, symbol: &str) -> bool {
        let wanted = symbol.trim();
        self.entries
            .iter()
            .any(|e| e.symbol.eq_ignore_ascii_case(wanted))
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trim and uppercase; allow letters, digits and `.-^=` (class shares, indices, FX).
pub fn normalize_symbol(raw: &str) -> Result<String, WatchlistError> {
    let symbol = raw.trim().to_ascii_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && !symbol.contains("..")
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if valid {
        Ok(symbol)
    } else {
        Err(WatchlistError::InvalidSymbol(raw.to_string()))
    }
}
