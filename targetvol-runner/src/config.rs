//! Serializable run configuration.
//!
//! A `RunConfig` captures everything needed to reproduce a simulation:
//! engine and execution parameters, signal-generator settings, universe,
//! date range, capital, and the data seed. Two identical configs hash to
//! the same `RunId`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use targetvol_core::engine::EngineConfig;
use targetvol_core::execution::ExecutionConfig;
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("engine config invalid: {0}")]
    Engine(#[from] targetvol_core::engine::ConfigError),
    #[error("universe is empty")]
    EmptyUniverse,
    #[error("end date {end} is before start date {start}")]
    DateOrder { start: NaiveDate, end: NaiveDate },
    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),
}

/// Trend-signal generator settings.
///
/// The generator compares the close to three moving averages. A signal is
/// produced only when all three distances agree on direction; strength is
/// `tanh(mean distance / temperature)`, floored at `min_magnitude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub short_window: usize,
    pub medium_window: usize,
    pub long_window: usize,
    /// Divisor applied to the mean distance before the tanh squash.
    pub temperature: f64,
    /// Signals weaker than this are suppressed entirely.
    pub min_magnitude: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            short_window: 10,
            medium_window: 30,
            long_window: 60,
            temperature: 0.05,
            min_magnitude: 0.05,
        }
    }
}

/// Serializable configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    /// Symbols to trade.
    pub universe: Vec<String>,
    /// First simulated trading day (inclusive).
    pub start_date: NaiveDate,
    /// Last simulated trading day (inclusive).
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    /// Master seed for the synthetic price paths.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    42
}

impl RunConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if self.end_date < self.start_date {
            return Err(ConfigError::DateOrder {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        Ok(())
    }

    /// Deterministic hash id for this configuration. Identical configs share
    /// a RunId, which makes runs content-addressable.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RunConfig {
        RunConfig {
            engine: EngineConfig::default(),
            execution: ExecutionConfig::default(),
            signal: SignalConfig::default(),
            universe: vec!["AAA".to_string(), "BBB".to_string()],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            initial_capital: 1_000_000.0,
            seed: 42,
        }
    }

    #[test]
    fn identical_configs_share_run_id() {
        assert_eq!(base_config().run_id(), base_config().run_id());
    }

    #[test]
    fn run_id_changes_with_any_field() {
        let a = base_config();
        let mut b = base_config();
        b.seed = 43;
        assert_ne!(a.run_id(), b.run_id());

        let mut c = base_config();
        c.engine.target_vol_annual = 0.12;
        assert_ne!(a.run_id(), c.run_id());
    }

    #[test]
    fn validation_rejects_bad_configs() {
        let mut empty = base_config();
        empty.universe.clear();
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyUniverse)));

        let mut reversed = base_config();
        reversed.end_date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(matches!(
            reversed.validate(),
            Err(ConfigError::DateOrder { .. })
        ));

        let mut broke = base_config();
        broke.initial_capital = 0.0;
        assert!(matches!(
            broke.validate(),
            Err(ConfigError::NonPositiveCapital(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = base_config();
        let text = toml::to_string(&config).unwrap();
        let parsed: RunConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.run_id(), config.run_id());
    }
}
