//! SignalChart Core: domain types, signal–price fusion, synthetic series, loaders.
//!
//! This crate contains the engine behind the watchlist chart:
//! - Domain types (price points, signal events, annotated points, plot channels)
//! - Temporal join with one-to-one nearest-first matching
//! - Classification into BUY/SELL/HOLD plot channels
//! - Series analytics (extrema, latest record, session boundaries)
//! - Seeded synthetic series generator
//! - HTTP and file loaders behind `PriceProvider` / `SignalProvider`
//! - Exchange time zone with the US daylight-saving rule
//! - TOML configuration and watchlist file

pub mod config;
pub mod data;
pub mod domain;
pub mod fusion;
pub mod rng;
pub mod synthetic;
pub mod watchlist;
pub mod zone;
