//! Weekly target computation: signal dedup, normalization, volatility
//! targeting, and the exposure caps, in that fixed order.

use super::config::EngineConfig;
use crate::domain::{Signal, Symbol};
use crate::risk::{
    apply_gross_cap, apply_net_cap, apply_per_name_cap, estimate_portfolio_vol, ReturnTracker,
};
use std::collections::HashMap;
use tracing::debug;

const TOTAL_ABS_EPS: f64 = 1e-8;
const VOL_EPS: f64 = 1e-8;

/// Output of one target computation.
#[derive(Debug, Clone, Default)]
pub struct TargetComputation {
    /// Fully risk-capped signed target weights.
    pub weights: HashMap<Symbol, f64>,
    /// abs(magnitude) per targeted symbol, for schedule/tier selection.
    pub strengths: HashMap<Symbol, f64>,
    /// The annualized vol estimate used for scaling; `None` when some
    /// weighted symbol lacked variance data and the vector was left unscaled.
    pub vol_estimate: Option<f64>,
}

impl TargetComputation {
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Compute the new weekly target vector from the day's signals.
///
/// Duplicate signals for a symbol resolve to the latest-generated one (ties
/// to the later-supplied). A degenerate signal set (total absolute raw weight
/// ≈ 0) yields empty targets, leaving the previous cycle's targets in effect.
pub fn compute_weekly_targets(
    signals: &[Signal],
    tracker: &ReturnTracker,
    config: &EngineConfig,
) -> TargetComputation {
    let mut latest_by_symbol: HashMap<Symbol, &Signal> = HashMap::new();
    for signal in signals {
        match latest_by_symbol.get(&signal.symbol) {
            Some(existing) if signal.generated < existing.generated => {}
            _ => {
                latest_by_symbol.insert(signal.symbol.clone(), signal);
            }
        }
    }

    let raw_weights: HashMap<Symbol, f64> = latest_by_symbol
        .iter()
        .map(|(symbol, signal)| (symbol.clone(), signal.raw_weight()))
        .collect();

    let total_abs: f64 = raw_weights.values().map(|w| w.abs()).sum();
    if total_abs < TOTAL_ABS_EPS {
        debug!("degenerate signal set, emitting no targets this cycle");
        return TargetComputation::default();
    }

    let mut weights: HashMap<Symbol, f64> = raw_weights
        .into_iter()
        .map(|(symbol, w)| (symbol, w / total_abs))
        .collect();

    let vol_estimate = estimate_portfolio_vol(&weights, tracker, config.min_obs);
    match vol_estimate {
        Some(vol) if vol > VOL_EPS => {
            let scale = config.target_vol_annual / vol;
            for w in weights.values_mut() {
                *w *= scale;
            }
        }
        Some(_) => {}
        None => {
            debug!("insufficient return history for vol estimate, leaving weights unscaled");
        }
    }

    apply_per_name_cap(&mut weights, config.max_weight);
    apply_gross_cap(&mut weights, config.max_gross);
    apply_net_cap(&mut weights, config.max_net);

    let strengths = latest_by_symbol
        .into_iter()
        .map(|(symbol, signal)| (symbol, signal.magnitude.abs()))
        .collect();

    TargetComputation {
        weights,
        strengths,
        vol_estimate,
    }
}
