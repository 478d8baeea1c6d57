//! Limit pricing by signal-strength tier.
//!
//! Buys price below market, sells above, by the tier's offset: strong orders
//! sit at market, moderate 0.5% away, weak 1.5% away. Prices round to the
//! symbol's tick size; with no tick size known they round to cents.

use crate::domain::SignalTier;

/// Limit offset (as a decimal fraction of price) for a tier.
pub fn offset_for_tier(tier: SignalTier, config: &OffsetConfig) -> f64 {
    match tier {
        SignalTier::Strong => config.strong_offset_pct,
        SignalTier::Moderate => config.moderate_offset_pct,
        SignalTier::Weak => config.weak_offset_pct,
        // Exits are market orders; the offset is never used.
        SignalTier::Exit => 0.0,
    }
}

/// Tier offsets, configurable per deployment.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OffsetConfig {
    pub strong_offset_pct: f64,
    pub moderate_offset_pct: f64,
    pub weak_offset_pct: f64,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            strong_offset_pct: 0.0,
            moderate_offset_pct: 0.005,
            weak_offset_pct: 0.015,
        }
    }
}

/// Compute a limit price offset from market, rounded to tick size.
///
/// Positive quantity (buy) prices below market, negative (sell) above.
/// A tick size of zero rounds to two decimals.
pub fn compute_limit_price(price: f64, quantity: f64, offset_pct: f64, tick_size: f64) -> f64 {
    let raw_price = if quantity > 0.0 {
        price * (1.0 - offset_pct)
    } else {
        price * (1.0 + offset_pct)
    };

    if tick_size > 0.0 {
        (raw_price / tick_size).round() * tick_size
    } else {
        (raw_price * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buys_price_below_market_sells_above() {
        assert_eq!(compute_limit_price(100.0, 10.0, 0.005, 0.0), 99.5);
        assert_eq!(compute_limit_price(100.0, -10.0, 0.005, 0.0), 100.5);
    }

    #[test]
    fn zero_offset_prices_at_market() {
        assert_eq!(compute_limit_price(412.37, 10.0, 0.0, 0.0), 412.37);
    }

    #[test]
    fn rounds_to_tick_size() {
        // 100 * 0.985 = 98.5; tick 0.25 → 98.5 stays.
        assert_eq!(compute_limit_price(100.0, 5.0, 0.015, 0.25), 98.5);
        // 99.37 with tick 0.25 rounds to 99.25.
        assert_eq!(compute_limit_price(99.37, 5.0, 0.0, 0.25), 99.25);
    }

    #[test]
    fn tier_offsets_have_expected_defaults() {
        let config = OffsetConfig::default();
        assert_eq!(offset_for_tier(SignalTier::Strong, &config), 0.0);
        assert_eq!(offset_for_tier(SignalTier::Moderate, &config), 0.005);
        assert_eq!(offset_for_tier(SignalTier::Weak, &config), 0.015);
    }
}
