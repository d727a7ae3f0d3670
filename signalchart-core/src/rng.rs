//! Seeded randomness for the synthetic generator.
//!
//! A master seed is expanded into per-(symbol, stream) sub-seeds with BLAKE3,
//! so a symbol's series never depends on which other symbols were generated
//! or in what order. There is no process-global RNG.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Where the master seed comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedPolicy {
    /// Reproducible: same seed, same symbol, same series.
    Fixed(u64),
    /// Fresh master seed drawn from OS entropy on every resolution.
    #[default]
    Entropy,
}

impl SeedPolicy {
    /// Resolve to a concrete master seed.
    pub fn resolve(&self) -> u64 {
        match *self {
            SeedPolicy::Fixed(seed) => seed,
            SeedPolicy::Entropy => rand::random(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the sub-seed for `(symbol, stream)`.
    pub fn sub_seed(&self, symbol: &str, stream: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        // Separator so ("AB", "C") and ("A", "BC") differ.
        hasher.update(&[0]);
        hasher.update(stream.as_bytes());
        hash_to_u64(&hasher.finalize())
    }

    pub fn rng_for(&self, symbol: &str, stream: &str) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(symbol, stream))
    }
}

/// First eight bytes of a BLAKE3 digest as a little-endian integer.
pub fn hash_to_u64(hash: &blake3::Hash) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(buf)
}
