//! The portfolio construction engine and its daily tick.
//!
//! One call per trading day drives, in order: rebalance detection, target
//! recomputation + classification + scale-state transitions (rebalance days)
//! or scale-state advancement (other days), then target emission. Emission is
//! deliberately sparse — symbols that need no motion emit nothing, so NAV
//! drift alone never regenerates an order.

use super::classify::{classify_symbols, Classification};
use super::config::EngineConfig;
use super::schedule::ScheduleSet;
use super::state::{EngineState, ScaleState, WeekPlan};
use super::targets::compute_weekly_targets;
use crate::domain::{HoldingsSnapshot, Signal, Symbol, WeekId};
use crate::risk::ReturnTracker;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Signal strength assumed when none was recorded for a symbol.
pub const DEFAULT_SIGNAL_STRENGTH: f64 = 0.5;

/// A desired-weight instruction handed to the order-placement layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DesiredWeight {
    pub symbol: Symbol,
    /// Signed fraction of NAV.
    pub weight: f64,
}

/// Result of one engine tick.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// Exits/flips first, then scale-in and resize instructions; each group
    /// sorted by symbol.
    pub desired_weights: Vec<DesiredWeight>,
    pub rebalanced: bool,
    /// Vol estimate used at the last rebalance, `None` on fallback days.
    pub vol_estimate: Option<f64>,
}

/// Read-only cycle state the execution layer needs from the engine.
///
/// Handed to the execution model as an explicit dependency — the execution
/// model never reaches back into the engine.
pub trait CycleInfo {
    /// Identifier of the current rebalance cycle, if one has happened.
    fn week_id(&self) -> Option<&WeekId>;

    /// Current scale day for a symbol with scale state.
    fn scale_day(&self, symbol: &str) -> Option<usize>;

    /// Recorded abs(magnitude) for a symbol, if it is currently targeted.
    fn signal_strength(&self, symbol: &str) -> Option<f64>;
}

impl CycleInfo for PortfolioEngine {
    fn week_id(&self) -> Option<&WeekId> {
        self.state.current_week_id.as_ref()
    }

    fn scale_day(&self, symbol: &str) -> Option<usize> {
        self.state.scale_states.get(symbol).map(|s| s.scale_day)
    }

    fn signal_strength(&self, symbol: &str) -> Option<f64> {
        self.state.signal_strengths.get(symbol).copied()
    }
}

/// Target-volatility portfolio construction engine.
pub struct PortfolioEngine {
    config: EngineConfig,
    schedules: ScheduleSet,
    returns: ReturnTracker,
    state: EngineState,
    /// External rebalance override; consumed by the next tick.
    force_rebalance: bool,
}

impl PortfolioEngine {
    pub fn new(config: EngineConfig) -> Self {
        let schedules = ScheduleSet::new(config.scaling_days());
        let returns = ReturnTracker::new(config.vol_lookback);
        Self {
            config,
            schedules,
            returns,
            state: EngineState::default(),
            force_rebalance: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn returns(&self) -> &ReturnTracker {
        &self.returns
    }

    /// Request a rebalance on the next tick regardless of the cadence counter.
    pub fn force_rebalance(&mut self) {
        self.force_rebalance = true;
    }

    /// Update rolling returns from today's closing prices. Symbols appearing
    /// for the first time start being tracked; missing bars are skipped.
    pub fn update_returns(&mut self, closes: &HashMap<Symbol, f64>) {
        for (symbol, &close) in closes {
            self.returns.on_close(symbol, close);
        }
    }

    /// The daily target pass. Returns the desired-weight instructions for the
    /// day; an empty signal set short-circuits to no instructions.
    pub fn create_targets(
        &mut self,
        date: NaiveDate,
        signals: &[Signal],
        holdings: &HoldingsSnapshot,
    ) -> TickOutcome {
        if signals.is_empty() {
            return TickOutcome::default();
        }

        let counter_rebalance = match self.state.trading_days_since_rebalance {
            None => true,
            Some(days) => days >= self.config.rebalance_interval(),
        };
        let is_rebalance_today = self.force_rebalance || counter_rebalance;
        self.force_rebalance = false;

        let mut desired = Vec::new();
        let mut flip_symbols: HashSet<String> = HashSet::new();
        let mut vol_estimate = None;

        if is_rebalance_today {
            // Snapshot actual holdings BEFORE any mutation from this cycle.
            let actual_weights = holdings.actual_weights();

            self.state.trading_days_since_rebalance = Some(1);
            let computed = compute_weekly_targets(signals, &self.returns, &self.config);
            if computed.is_empty() {
                // Degenerate signal set: emit nothing this cycle and leave the
                // previous targets in effect until overwritten.
                return TickOutcome {
                    desired_weights: Vec::new(),
                    rebalanced: true,
                    vol_estimate: None,
                };
            }
            vol_estimate = computed.vol_estimate;
            for symbol in computed.weights.keys() {
                self.returns.track(symbol);
            }
            self.state.weekly_targets = computed.weights;
            self.state.signal_strengths = computed.strengths;

            self.initialize_week_plan(date, holdings);

            let classifications = classify_symbols(
                &self.state.weekly_targets,
                &self.state.previous_weekly_targets,
                &actual_weights,
                self.config.dead_band,
            );

            for (symbol, classification) in &classifications {
                match classification {
                    Classification::NewEntry => {
                        self.state
                            .scale_states
                            .insert(symbol.clone(), ScaleState::scaling());
                    }
                    Classification::Flip => {
                        // scale_day stays 0 today: the flip is skipped in the
                        // emission loop, and the next day's advance moves
                        // 0 → 1 before emission, so the entry leg starts at
                        // schedule[1].
                        self.state
                            .scale_states
                            .insert(symbol.clone(), ScaleState::scaling());
                    }
                    Classification::Resize | Classification::Hold => {
                        // Force steady state. A leftover is_scaling=true would
                        // let the emission loop turn NAV drift into
                        // micro-orders.
                        self.state
                            .scale_states
                            .insert(symbol.clone(), ScaleState::steady());
                    }
                    Classification::Exit => {
                        self.state.scale_states.remove(symbol);
                    }
                }
            }

            // Emit EXIT/FLIP zero-weight instructions before
            // previous_weekly_targets is overwritten.
            let mut leaving: Vec<&String> = classifications
                .iter()
                .filter(|(_, c)| matches!(c, Classification::Exit | Classification::Flip))
                .map(|(symbol, _)| symbol)
                .collect();
            leaving.sort();
            for symbol in leaving {
                desired.push(DesiredWeight {
                    symbol: symbol.clone(),
                    weight: 0.0,
                });
                if classifications[symbol] == Classification::Flip {
                    flip_symbols.insert(symbol.clone());
                }
            }

            self.state.previous_weekly_targets = self.state.weekly_targets.clone();
            self.state.last_classifications = classifications;
        } else {
            self.state.trading_days_since_rebalance =
                Some(self.state.trading_days_since_rebalance.unwrap_or(0) + 1);

            // Advance scale state BEFORE emission.
            let ceiling = self.config.scaling_days() - 1;
            for scale_state in self.state.scale_states.values_mut() {
                if scale_state.is_scaling {
                    if scale_state.scale_day < ceiling {
                        scale_state.scale_day += 1;
                    } else {
                        scale_state.is_scaling = false;
                    }
                }
            }
        }

        // Emit only for symbols that need action today. HOLD symbols and
        // fully scaled-in symbols are silent; re-emitting an unchanged
        // percent-of-NAV target would generate spurious orders from NAV
        // drift alone.
        let mut targeted: Vec<(&String, f64)> = self
            .state
            .weekly_targets
            .iter()
            .map(|(symbol, &w)| (symbol, w))
            .collect();
        targeted.sort_by(|a, b| a.0.cmp(b.0));

        for (symbol, final_weight) in targeted {
            if is_rebalance_today && flip_symbols.contains(symbol) {
                continue;
            }

            let scale_state = self
                .state
                .scale_states
                .get(symbol)
                .copied()
                .unwrap_or_default();

            if scale_state.is_scaling {
                let strength = self
                    .state
                    .signal_strengths
                    .get(symbol)
                    .copied()
                    .unwrap_or(DEFAULT_SIGNAL_STRENGTH);
                let fraction = self.schedules.fraction(strength, scale_state.scale_day);
                desired.push(DesiredWeight {
                    symbol: symbol.clone(),
                    weight: final_weight * fraction,
                });
            } else if is_rebalance_today
                && self.state.last_classifications.get(symbol)
                    == Some(&Classification::Resize)
            {
                // Resize takes effect immediately at full weight.
                desired.push(DesiredWeight {
                    symbol: symbol.clone(),
                    weight: final_weight,
                });
            }
        }

        self.log_summary(date);

        TickOutcome {
            desired_weights: desired,
            rebalanced: is_rebalance_today,
            vol_estimate,
        }
    }

    /// Current cumulative scale-in fraction for a symbol (1.0 once steady).
    pub fn current_fraction(&self, symbol: &str) -> f64 {
        let scale_state = self
            .state
            .scale_states
            .get(symbol)
            .copied()
            .unwrap_or_default();
        if !scale_state.is_scaling {
            return 1.0;
        }
        let strength = self
            .state
            .signal_strengths
            .get(symbol)
            .copied()
            .unwrap_or(DEFAULT_SIGNAL_STRENGTH);
        self.schedules.fraction(strength, scale_state.scale_day)
    }

    /// Start tracking a symbol that joined the universe.
    pub fn on_symbol_added(&mut self, symbol: &str) {
        self.returns.track(symbol);
    }

    /// Synchronously evict every per-symbol record for a removed symbol.
    pub fn on_symbol_removed(&mut self, symbol: &str) {
        self.returns.remove(symbol);
        self.state.remove_symbol(symbol);
    }

    fn initialize_week_plan(&mut self, date: NaiveDate, holdings: &HoldingsSnapshot) {
        self.state.current_week_id = Some(WeekId::from_date(date));
        self.state.week_plan.clear();

        let mut plan_symbols: HashSet<String> =
            self.state.weekly_targets.keys().cloned().collect();
        plan_symbols.extend(holdings.invested_symbols().cloned());

        for symbol in plan_symbols {
            let start_weight = holdings.weight_of(&symbol);
            let weekly_target_weight =
                self.state.weekly_targets.get(&symbol).copied().unwrap_or(0.0);
            self.state.week_plan.insert(
                symbol,
                WeekPlan {
                    start_weight,
                    weekly_target_weight,
                },
            );
        }
    }

    fn log_summary(&self, date: NaiveDate) {
        let effective: Vec<f64> = self
            .state
            .weekly_targets
            .iter()
            .map(|(symbol, &w)| w * self.current_fraction(symbol))
            .collect();
        let gross: f64 = effective.iter().map(|w| w.abs()).sum();
        let net: f64 = effective.iter().sum();
        let scaling_count = self
            .state
            .scale_states
            .values()
            .filter(|s| s.is_scaling)
            .count();
        debug!(
            date = %date,
            scaling_count,
            gross = format!("{:.0}%", gross * 100.0),
            net = format!("{:+.0}%", net * 100.0),
            "portfolio construction summary"
        );
    }
}
