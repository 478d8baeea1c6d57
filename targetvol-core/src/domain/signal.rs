//! Trend signals consumed by the portfolio engine.
//!
//! Signals arrive once per trading day from an external generator. The engine
//! only reads them; it never computes or forecasts. A signal is ephemeral —
//! nothing beyond the latest per-symbol (direction, magnitude) survives the
//! rebalance cycle that consumed it.

use super::Symbol;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Desired exposure direction for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Sign applied to the signal magnitude when building raw weights.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }
}

/// One per-symbol trend signal for the current trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: Symbol,
    pub direction: Direction,
    /// Signal strength in [0, 1].
    pub magnitude: f64,
    /// Generation timestamp; when the same symbol appears more than once in a
    /// daily set, the latest-generated signal wins.
    pub generated: NaiveDateTime,
}

impl Signal {
    /// Signed raw weight: `sign(direction) * magnitude`.
    pub fn raw_weight(&self) -> f64 {
        self.direction.sign() * self.magnitude
    }
}

/// Signal-strength tier, shared by the scaling scheduler (which schedule a
/// symbol follows) and the execution model (how aggressive its limit orders
/// are). `Exit` is assigned at order-placement time only, never from strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalTier {
    Strong,
    Moderate,
    Weak,
    Exit,
}

impl SignalTier {
    /// Tier from absolute signal strength: >= 0.70 strong, >= 0.30 moderate,
    /// below weak.
    pub fn from_strength(strength: f64) -> Self {
        Self::from_strength_with(strength, 0.70, 0.30)
    }

    /// Tier with explicit thresholds (the execution model's are configurable).
    pub fn from_strength_with(strength: f64, strong: f64, moderate: f64) -> Self {
        let abs = strength.abs();
        if abs >= strong {
            SignalTier::Strong
        } else if abs >= moderate {
            SignalTier::Moderate
        } else {
            SignalTier::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalTier::Strong => "strong",
            SignalTier::Moderate => "moderate",
            SignalTier::Weak => "weak",
            SignalTier::Exit => "exit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    #[test]
    fn raw_weight_is_signed_magnitude() {
        let up = Signal {
            symbol: "AAA".into(),
            direction: Direction::Up,
            magnitude: 0.8,
            generated: ts(),
        };
        let down = Signal {
            symbol: "BBB".into(),
            direction: Direction::Down,
            magnitude: 0.2,
            generated: ts(),
        };
        assert_eq!(up.raw_weight(), 0.8);
        assert_eq!(down.raw_weight(), -0.2);
    }

    #[test]
    fn tier_thresholds() {
        assert_eq!(SignalTier::from_strength(0.95), SignalTier::Strong);
        assert_eq!(SignalTier::from_strength(0.70), SignalTier::Strong);
        assert_eq!(SignalTier::from_strength(0.69), SignalTier::Moderate);
        assert_eq!(SignalTier::from_strength(0.30), SignalTier::Moderate);
        assert_eq!(SignalTier::from_strength(0.29), SignalTier::Weak);
        // Down signals tier on magnitude, not sign.
        assert_eq!(SignalTier::from_strength(-0.8), SignalTier::Strong);
    }
}
