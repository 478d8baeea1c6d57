//! Mutable per-cycle engine state.

use super::classify::Classification;
use crate::domain::{Symbol, WeekId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-symbol scale-in progress.
///
/// `scale_day` counts trading days into the scale-in window; `is_scaling`
/// marks symbols still walking their schedule. Reset to day zero on entry or
/// flip, forced to steady state on resize/hold, removed on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleState {
    pub scale_day: usize,
    pub is_scaling: bool,
}

impl ScaleState {
    pub fn scaling() -> Self {
        Self {
            scale_day: 0,
            is_scaling: true,
        }
    }

    pub fn steady() -> Self {
        Self {
            scale_day: 0,
            is_scaling: false,
        }
    }
}

impl Default for ScaleState {
    fn default() -> Self {
        Self::steady()
    }
}

/// Immutable-per-cycle plan entry, kept for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    /// Actual weight at cycle start.
    pub start_weight: f64,
    /// Final target weight for the cycle.
    pub weekly_target_weight: f64,
}

/// Everything the engine mutates across daily ticks.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    /// Final target weight per symbol from the last rebalance.
    pub weekly_targets: HashMap<Symbol, f64>,
    /// Targets from the rebalance before that, for classification.
    pub previous_weekly_targets: HashMap<Symbol, f64>,
    /// abs(magnitude) recorded from the signal that produced each target.
    pub signal_strengths: HashMap<Symbol, f64>,
    /// Per-symbol scale-in progress.
    pub scale_states: HashMap<Symbol, ScaleState>,
    /// Reporting plan for the current cycle.
    pub week_plan: HashMap<Symbol, WeekPlan>,
    /// Date of the most recent rebalance; `None` before the first one.
    pub current_week_id: Option<WeekId>,
    /// Trading days since the last rebalance; `None` forces a rebalance on
    /// the first tick.
    pub trading_days_since_rebalance: Option<usize>,
    /// Most recent rebalance classifications, for reporting.
    pub last_classifications: HashMap<Symbol, Classification>,
}

impl EngineState {
    /// Evict every per-symbol entry for a symbol leaving the universe.
    pub fn remove_symbol(&mut self, symbol: &str) {
        self.weekly_targets.remove(symbol);
        self.previous_weekly_targets.remove(symbol);
        self.signal_strengths.remove(symbol);
        self.scale_states.remove(symbol);
        self.week_plan.remove(symbol);
        self.last_classifications.remove(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_symbol_evicts_every_map() {
        let mut state = EngineState::default();
        state.weekly_targets.insert("AAA".into(), 0.05);
        state.previous_weekly_targets.insert("AAA".into(), 0.04);
        state.signal_strengths.insert("AAA".into(), 0.8);
        state.scale_states.insert("AAA".into(), ScaleState::scaling());
        state.week_plan.insert(
            "AAA".into(),
            WeekPlan {
                start_weight: 0.0,
                weekly_target_weight: 0.05,
            },
        );
        state
            .last_classifications
            .insert("AAA".into(), Classification::NewEntry);

        state.remove_symbol("AAA");
        assert!(state.weekly_targets.is_empty());
        assert!(state.previous_weekly_targets.is_empty());
        assert!(state.signal_strengths.is_empty());
        assert!(state.scale_states.is_empty());
        assert!(state.week_plan.is_empty());
        assert!(state.last_classifications.is_empty());
    }
}
