//! Prediction consensus and market-value engine for football fixtures
//!
//! Aggregates per-fixture model predictions and bookmaker odds from an
//! external data provider into one decision-ready result.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (server) → FixtureAnalyzer (engine) ⇄ ResultCache (cache)
//!                        ↓ miss
//!                 FixtureProvider (client)
//!                        ↓
//! Normalizer → Consensus (model) → Odds (odds) → EV (strategy) → Market (analysis)
//! ```

pub mod analysis;
pub mod cache;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod odds;
pub mod server;
pub mod strategy;
pub mod types;

#[cfg(test)]
mod types_tests;
