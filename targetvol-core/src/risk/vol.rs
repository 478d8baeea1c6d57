//! Diagonal portfolio volatility estimator.
//!
//! Portfolio daily variance is approximated as Σ wᵢ²·σᵢ² over the weighted
//! symbols, ignoring cross-symbol covariance, then annualized by √252. The
//! estimate is all-or-nothing: if any symbol with non-negligible weight lacks
//! `min_obs` observations the whole estimate is unavailable (`None`), never a
//! best-effort partial number.

use super::returns::ReturnTracker;
use crate::domain::Symbol;
use std::collections::HashMap;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const WEIGHT_EPS: f64 = 1e-8;

/// Sample variance with the n−1 denominator. `None` for fewer than two
/// observations.
pub fn sample_variance(returns: impl ExactSizeIterator<Item = f64> + Clone) -> Option<f64> {
    let n = returns.len();
    if n < 2 {
        return None;
    }
    let mean = returns.clone().sum::<f64>() / n as f64;
    let sum_sq: f64 = returns.map(|r| (r - mean) * (r - mean)).sum();
    Some(sum_sq / (n - 1) as f64)
}

/// Annualized diagonal portfolio volatility for a weight vector.
///
/// Returns `None` when any symbol with |w| > 1e-8 has fewer than `min_obs`
/// observations in the tracker.
pub fn estimate_portfolio_vol(
    weights: &HashMap<Symbol, f64>,
    tracker: &ReturnTracker,
    min_obs: usize,
) -> Option<f64> {
    let mut port_var = 0.0;
    for (symbol, &weight) in weights {
        if weight.abs() <= WEIGHT_EPS {
            continue;
        }
        let window = tracker.window(symbol)?;
        if window.len() < min_obs {
            return None;
        }
        let variance = sample_variance(window.iter().copied())?;
        port_var += weight * weight * variance;
    }
    Some((port_var * TRADING_DAYS_PER_YEAR).sqrt())
}
