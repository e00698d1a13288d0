//! Simulator settings.
//!
//! Defaults reproduce the standard San Francisco load profile. Every field can be
//! overridden from a JSON document (missing fields keep their default) and a handful of
//! them from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `SIM_CITY` | `city` |
//! | `SIM_RESTAURANT_LIMIT` | `restaurant_limit` |
//! | `SIM_LOCATIONS` | `locations_path` |
//! | `SIM_PROFILE` | `docker` or `development` turns `retry.enabled` on |
//! | `SIM_SEED` | `seed` |

use crate::clients::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

/// Profiles that run with client retries enabled.
const RETRY_PROFILES: [&str; 2] = ["docker", "development"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_attempts: u32,
    pub initial_interval_ms: u64,
    pub multiplier: f64,
    pub max_interval_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: 10,
            initial_interval_ms: 1000,
            multiplier: 10.0,
            max_interval_ms: 100_000,
        }
    }
}

impl RetryConfig {
    /// Backoff policy for the retrying client. A multiplier below one, or not a number,
    /// becomes one: intervals never shrink.
    pub fn policy(&self) -> RetryPolicy {
        let multiplier = if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            1.0
        };
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            multiplier,
            max_interval: Duration::from_millis(self.max_interval_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Only restaurants in this city are simulated.
    pub city: String,
    pub restaurant_limit: usize,
    /// Lower bound of a restaurant's new-order interval.
    pub new_order_min_ms: u64,
    /// Upper bound of the uniform jitter added to `new_order_min_ms`.
    pub new_order_jitter_ms: u64,
    /// Frame tick interval, shared by every restaurant.
    pub preparation_time_ms: u64,
    pub preparation_rate: f64,
    pub retry: RetryConfig,
    pub locations_path: String,
    /// Master RNG seed. Random when absent.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            city: "San Francisco".to_string(),
            restaurant_limit: 50,
            new_order_min_ms: 60_000,
            new_order_jitter_ms: 35_000,
            preparation_time_ms: 1000,
            preparation_rate: 15.0,
            retry: RetryConfig::default(),
            locations_path: "data/locations.json".to_string(),
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Parses a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies the `SIM_*` overrides found through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(city) = lookup("SIM_CITY") {
            self.city = city;
        }
        if let Some(limit) = lookup("SIM_RESTAURANT_LIMIT") {
            self.restaurant_limit = parse("SIM_RESTAURANT_LIMIT", &limit)?;
        }
        if let Some(path) = lookup("SIM_LOCATIONS") {
            self.locations_path = path;
        }
        if let Some(profile) = lookup("SIM_PROFILE") {
            let profile = profile.trim().to_ascii_lowercase();
            self.retry.enabled = RETRY_PROFILES.contains(&profile.as_str());
        }
        if let Some(seed) = lookup("SIM_SEED") {
            self.seed = Some(parse("SIM_SEED", &seed)?);
        }
        self.validate()?;
        Ok(self)
    }

    /// Rejects numeric settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.preparation_rate.is_finite() || self.preparation_rate < 0.0 {
            return Err(invalid("preparation_rate", self.preparation_rate));
        }
        if !self.retry.multiplier.is_finite() || self.retry.multiplier < 1.0 {
            return Err(invalid("retry.multiplier", self.retry.multiplier));
        }
        Ok(())
    }

    /// Range a restaurant's new-order interval is drawn from.
    pub fn new_order_range(&self) -> RangeInclusive<u64> {
        self.new_order_min_ms..=self.new_order_min_ms.saturating_add(self.new_order_jitter_ms)
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}
