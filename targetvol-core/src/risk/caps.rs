//! Exposure caps applied to target weight vectors.
//!
//! Cap order is fixed: per-name clip → gross scale → net scale. Later caps
//! only ever shrink weights, so they cannot re-violate an earlier cap; the
//! reverse ordering could leave a net-exposure violation introduced by the
//! gross rescale. Post-conditions are debug-asserted — a violation here is a
//! defect in the capping order, not a recoverable condition.

use crate::domain::Symbol;
use std::collections::HashMap;

/// Sum of absolute weights.
pub fn gross_exposure(weights: &HashMap<Symbol, f64>) -> f64 {
    weights.values().map(|w| w.abs()).sum()
}

/// Signed sum of weights (long minus short).
pub fn net_exposure(weights: &HashMap<Symbol, f64>) -> f64 {
    weights.values().sum()
}

/// Clip each weight to `[-max_weight, +max_weight]`.
pub fn apply_per_name_cap(weights: &mut HashMap<Symbol, f64>, max_weight: f64) {
    for w in weights.values_mut() {
        *w = w.clamp(-max_weight, max_weight);
    }
    debug_assert!(
        weights.values().all(|w| w.abs() <= max_weight + 1e-12),
        "per-name cap violated after clip"
    );
}

/// If gross exposure exceeds `max_gross`, scale all weights proportionally.
pub fn apply_gross_cap(weights: &mut HashMap<Symbol, f64>, max_gross: f64) {
    let gross = gross_exposure(weights);
    if gross > max_gross {
        let scale = max_gross / gross;
        for w in weights.values_mut() {
            *w *= scale;
        }
    }
    debug_assert!(
        gross_exposure(weights) <= max_gross + 1e-9,
        "gross cap violated after rescale"
    );
}

/// If |net exposure| exceeds `max_net`, scale all weights proportionally.
pub fn apply_net_cap(weights: &mut HashMap<Symbol, f64>, max_net: f64) {
    let net = net_exposure(weights);
    if net.abs() > max_net {
        let scale = max_net / net.abs();
        for w in weights.values_mut() {
            *w *= scale;
        }
    }
    debug_assert!(
        net_exposure(weights).abs() <= max_net + 1e-9,
        "net cap violated after rescale"
    );
}
