//! Per-symbol daily state rows for reporting/introspection.
//!
//! Rows describe the current week plan against actual holdings. They carry no
//! control flow — the host's logging layer consumes them as-is.

use super::portfolio::PortfolioEngine;
use crate::domain::{HoldingsSnapshot, Symbol};
use serde::{Deserialize, Serialize};

/// One symbol's daily state under the current week plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStateRow {
    pub week_id: String,
    pub symbol: Symbol,
    /// Actual weight at cycle start.
    pub start_w: f64,
    /// Final target weight for the cycle.
    pub weekly_target_w: f64,
    /// Today's cumulative scale-in fraction (1.0 once steady).
    pub scheduled_fraction: f64,
    /// `weekly_target_w * scheduled_fraction`.
    pub scheduled_w: f64,
    /// Current actual weight from holdings.
    pub actual_w: f64,
    pub scale_day: usize,
    pub is_scaling: bool,
    /// Most recent rebalance classification, empty if none.
    pub classification: String,
}

fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

/// Build the daily report rows, sorted by symbol. Empty before the first
/// rebalance establishes a week plan.
pub fn daily_target_state(
    engine: &PortfolioEngine,
    holdings: &HoldingsSnapshot,
) -> Vec<TargetStateRow> {
    let state = engine.state();
    if state.week_plan.is_empty() {
        return Vec::new();
    }

    let week_id = state
        .current_week_id
        .as_ref()
        .map(|w| w.as_str().to_string())
        .unwrap_or_default();

    let mut symbols: Vec<&String> = state.week_plan.keys().collect();
    symbols.sort();

    symbols
        .into_iter()
        .map(|symbol| {
            let plan = &state.week_plan[symbol];
            let scale_state = state.scale_states.get(symbol).copied().unwrap_or_default();

            let (scheduled_fraction, scheduled_w) =
                if state.weekly_targets.contains_key(symbol) {
                    let fraction = engine.current_fraction(symbol);
                    (fraction, plan.weekly_target_weight * fraction)
                } else {
                    (1.0, plan.weekly_target_weight)
                };

            TargetStateRow {
                week_id: week_id.clone(),
                symbol: symbol.clone(),
                start_w: round8(plan.start_weight),
                weekly_target_w: round8(plan.weekly_target_weight),
                scheduled_fraction: round8(scheduled_fraction),
                scheduled_w: round8(scheduled_w),
                actual_w: round8(holdings.weight_of(symbol)),
                scale_day: scale_state.scale_day,
                is_scaling: scale_state.is_scaling,
                classification: state
                    .last_classifications
                    .get(symbol)
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
            }
        })
        .collect()
}
