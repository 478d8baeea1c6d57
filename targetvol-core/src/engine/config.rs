//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be positive and finite (got {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("dead_band must be non-negative and finite (got {0})")]
    BadDeadBand(f64),

    #[error("min_obs ({min_obs}) must not exceed vol_lookback ({vol_lookback})")]
    MinObsExceedsLookback { min_obs: usize, vol_lookback: usize },
}

/// Configuration for the portfolio construction engine.
///
/// Defaults target 10% annualized volatility with 150% gross / 50% net
/// exposure ceilings, a 10% per-name cap, a 63-day return lookback, and a
/// five-day scale-in window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Annualized volatility the weight vector is scaled toward.
    pub target_vol_annual: f64,
    /// Maximum gross exposure (sum of absolute weights).
    pub max_gross: f64,
    /// Maximum absolute net exposure (signed sum of weights).
    pub max_net: f64,
    /// Per-name weight cap.
    pub max_weight: f64,
    /// Rolling return window length for vol estimation.
    pub vol_lookback: usize,
    /// Minimum observations before a symbol has usable variance data.
    pub min_obs: usize,
    /// Trading days over which new positions scale in.
    pub scaling_days: usize,
    /// Trading days between rebalances. `None` = same as `scaling_days`.
    pub rebalance_interval_days: Option<usize>,
    /// Tolerance (fraction of NAV) within which an unchanged target is HOLD
    /// rather than RESIZE. Suppresses churn from NAV drift; 0.0 disables.
    pub dead_band: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_vol_annual: 0.10,
            max_gross: 1.50,
            max_net: 0.50,
            max_weight: 0.10,
            vol_lookback: 63,
            min_obs: 20,
            scaling_days: 5,
            rebalance_interval_days: None,
            dead_band: 0.015,
        }
    }
}

impl EngineConfig {
    /// Scale-in window length, never below one day.
    pub fn scaling_days(&self) -> usize {
        self.scaling_days.max(1)
    }

    /// Trading days between rebalances, never below one.
    pub fn rebalance_interval(&self) -> usize {
        self.rebalance_interval_days
            .unwrap_or(self.scaling_days())
            .max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("target_vol_annual", self.target_vol_annual),
            ("max_gross", self.max_gross),
            ("max_net", self.max_net),
            ("max_weight", self.max_weight),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if !(self.dead_band.is_finite() && self.dead_band >= 0.0) {
            return Err(ConfigError::BadDeadBand(self.dead_band));
        }
        if self.min_obs > self.vol_lookback {
            return Err(ConfigError::MinObsExceedsLookback {
                min_obs: self.min_obs,
                vol_lookback: self.vol_lookback,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rebalance_interval_defaults_to_scaling_days() {
        let config = EngineConfig::default();
        assert_eq!(config.rebalance_interval(), 5);

        let weekly = EngineConfig {
            rebalance_interval_days: Some(10),
            ..EngineConfig::default()
        };
        assert_eq!(weekly.rebalance_interval(), 10);
    }

    #[test]
    fn zero_scaling_days_clamps_to_one() {
        let config = EngineConfig {
            scaling_days: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.scaling_days(), 1);
        assert_eq!(config.rebalance_interval(), 1);
    }

    #[test]
    fn bad_caps_rejected() {
        let config = EngineConfig {
            max_gross: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            min_obs: 100,
            vol_lookback: 63,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
