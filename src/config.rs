//! Service configuration
//!
//! Loaded from an optional TOML file, then overridden by `APP_`-prefixed
//! environment variables (`APP_PROVIDER__API_TOKEN`, `APP_SERVER__PORT`, ...).

use crate::error::{Result, ServiceError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `path` (optional) and the environment
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::from(Path::new(path)).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_token.trim().is_empty() {
            return Err(ServiceError::Config(
                "provider.api_token is required (set APP_PROVIDER__API_TOKEN)".into(),
            ));
        }
        if self.engine.min_odds >= self.engine.max_odds {
            return Err(ServiceError::Config(format!(
                "engine.min_odds ({}) must be below engine.max_odds ({})",
                self.engine.min_odds, self.engine.max_odds
            )));
        }
        if self.engine.ev_capped_pct > self.engine.ev_ceiling_pct {
            return Err(ServiceError::Config(
                "engine.ev_capped_pct must not exceed engine.ev_ceiling_pct".into(),
            ));
        }
        let c = &self.cache;
        if c.short_ttl_secs == 0
            || c.short_ttl_secs > c.medium_ttl_secs
            || c.medium_ttl_secs > c.long_ttl_secs
        {
            return Err(ServiceError::Config(format!(
                "cache TTLs must satisfy 0 < short ({}) <= medium ({}) <= long ({})",
                c.short_ttl_secs, c.medium_ttl_secs, c.long_ttl_secs
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// How upstream probability values are encoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityScale {
    /// Any value above 1 marks the triple as percentages
    #[default]
    Auto,
    /// Values are always percentages (0-100)
    Percent,
    /// Values are always fractions (0-1)
    Fraction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Prediction type carrying full-time result probabilities
    #[serde(default = "default_prediction_type_id")]
    pub prediction_type_id: u64,
    /// Odds market for full-time 1X2
    #[serde(default = "default_market_id")]
    pub market_id: u64,
    #[serde(default)]
    pub probability_scale: ProbabilityScale,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
            prediction_type_id: default_prediction_type_id(),
            market_id: default_market_id(),
            probability_scale: ProbabilityScale::default(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// TTL windows per volatility class
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Fixture identity, teams, league
    #[serde(default = "default_long_ttl")]
    pub long_ttl_secs: u64,
    /// Model predictions
    #[serde(default = "default_medium_ttl")]
    pub medium_ttl_secs: u64,
    /// Bookmaker odds
    #[serde(default = "default_short_ttl")]
    pub short_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            long_ttl_secs: default_long_ttl(),
            medium_ttl_secs: default_medium_ttl(),
            short_ttl_secs: default_short_ttl(),
        }
    }
}

/// Numeric guards applied by the analysis pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Allowed drift of a probability sum from 100, in percentage points
    #[serde(default = "default_sum_tolerance")]
    pub sum_tolerance_pct: f64,
    /// Odds must be strictly above this
    #[serde(default = "default_min_odds")]
    pub min_odds: f64,
    /// Odds must be strictly below this
    #[serde(default = "default_max_odds")]
    pub max_odds: f64,
    /// EV above this is treated as a data anomaly
    #[serde(default = "default_ev_ceiling")]
    pub ev_ceiling_pct: f64,
    /// Value reported in place of an anomalous EV
    #[serde(default = "default_ev_capped")]
    pub ev_capped_pct: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sum_tolerance_pct: default_sum_tolerance(),
            min_odds: default_min_odds(),
            max_odds: default_max_odds(),
            ev_ceiling_pct: default_ev_ceiling(),
            ev_capped_pct: default_ev_capped(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "https://api.sportmonks.com/v3/football".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_prediction_type_id() -> u64 {
    237
}

fn default_market_id() -> u64 {
    1
}

fn default_long_ttl() -> u64 {
    86_400
}

fn default_medium_ttl() -> u64 {
    3_600
}

fn default_short_ttl() -> u64 {
    300
}

fn default_sum_tolerance() -> f64 {
    5.0
}

fn default_min_odds() -> f64 {
    1.01
}

fn default_max_odds() -> f64 {
    1000.0
}

fn default_ev_ceiling() -> f64 {
    100.0
}

fn default_ev_capped() -> f64 {
    50.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
