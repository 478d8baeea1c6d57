//! The daily pipeline: one strictly sequential tick per trading day.
//!
//! Order of operations, fixed: (a) return-window update, (b) stale-order
//! cancellation (at most once per calendar day), (c) classification and
//! target computation, (d) target emission and order generation. All work is
//! synchronous in-memory computation; the host must not re-enter the tick
//! for the same day.

use super::portfolio::{PortfolioEngine, TickOutcome};
use super::EngineConfig;
use crate::domain::{HoldingsSnapshot, OrderEvent, OrderId, OrderRequest, Signal, Symbol};
use crate::engine::DesiredWeight;
use crate::execution::{ExecutionConfig, ExecutionWarning, SignalExecutionModel};
use chrono::NaiveDate;
use std::collections::HashMap;

/// One trading day's inputs, read-only.
#[derive(Debug, Clone, Copy)]
pub struct DailyInputs<'a> {
    pub date: NaiveDate,
    /// Closing price per symbol; symbols without a bar today are absent.
    pub closes: &'a HashMap<Symbol, f64>,
    /// Account snapshot taken before any of today's mutations.
    pub holdings: &'a HoldingsSnapshot,
    /// Today's signal set from the external generator.
    pub signals: &'a [Signal],
}

/// Everything a tick hands back to the host.
#[derive(Debug, Clone, Default)]
pub struct DayOutput {
    /// Stale orders to cancel at the venue, decided before emission.
    pub cancellations: Vec<OrderId>,
    /// The engine's desired-weight instructions for the day.
    pub desired_weights: Vec<DesiredWeight>,
    /// Orders to place at the venue.
    pub orders: Vec<OrderRequest>,
    /// Recoverable conditions (fallback cancellation, etc).
    pub warnings: Vec<ExecutionWarning>,
    pub rebalanced: bool,
}

/// Owns the engine and the execution model and runs the daily sequence.
///
/// The execution model reads cycle state through the engine's `CycleInfo`
/// interface only; all mutation happens here, in tick order.
pub struct DailyPipeline {
    engine: PortfolioEngine,
    execution: SignalExecutionModel,
    last_cancel_check_date: Option<NaiveDate>,
}

impl DailyPipeline {
    pub fn new(engine_config: EngineConfig, execution_config: ExecutionConfig) -> Self {
        Self {
            engine: PortfolioEngine::new(engine_config),
            execution: SignalExecutionModel::new(execution_config),
            last_cancel_check_date: None,
        }
    }

    pub fn engine(&self) -> &PortfolioEngine {
        &self.engine
    }

    pub fn execution(&self) -> &SignalExecutionModel {
        &self.execution
    }

    /// Request a rebalance on the next tick.
    pub fn force_rebalance(&mut self) {
        self.engine.force_rebalance();
    }

    /// The daily tick.
    pub fn on_data(&mut self, inputs: DailyInputs<'_>) -> DayOutput {
        self.engine.update_returns(inputs.closes);

        let (cancellations, warnings) = if self.last_cancel_check_date != Some(inputs.date) {
            self.last_cancel_check_date = Some(inputs.date);
            let week_id = self.engine.state().current_week_id.clone();
            self.execution.cancel_stale_orders(week_id.as_ref())
        } else {
            (Vec::new(), Vec::new())
        };

        let TickOutcome {
            desired_weights,
            rebalanced,
            ..
        } = self
            .engine
            .create_targets(inputs.date, inputs.signals, inputs.holdings);

        let orders = self.execution.execute(
            &desired_weights,
            &self.engine,
            inputs.holdings,
            inputs.closes,
        );

        DayOutput {
            cancellations,
            desired_weights,
            orders,
            warnings,
            rebalanced,
        }
    }

    /// Forward a venue event to the order book. Idempotent; events for
    /// unknown orders or symbols are ignored.
    pub fn on_order_event(&mut self, event: &OrderEvent) {
        self.execution.on_order_event(event);
    }

    /// A symbol joined the managed universe.
    pub fn on_symbol_added(&mut self, symbol: &str) {
        self.engine.on_symbol_added(symbol);
    }

    /// A symbol left the managed universe: evict all engine state and cancel
    /// its open orders regardless of cycle. Returns the venue cancellations.
    pub fn on_symbol_removed(&mut self, symbol: &str) -> Vec<OrderId> {
        self.engine.on_symbol_removed(symbol);
        self.execution.on_symbol_removed(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use crate::execution::CancelPolicy;

    fn signal(symbol: &str, direction: Direction, magnitude: f64, date: NaiveDate) -> Signal {
        Signal {
            symbol: symbol.into(),
            direction,
            magnitude,
            generated: date.and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    fn closes(pairs: &[(&str, f64)]) -> HashMap<Symbol, f64> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn warmed_pipeline(execution_config: ExecutionConfig) -> DailyPipeline {
        let mut pipeline = DailyPipeline::new(EngineConfig::default(), execution_config);
        // 41 closes → 40 returns per symbol, enough for min_obs.
        for i in 0..41 {
            let drift: f64 = if i % 2 == 0 { 1.0 } else { 1.01 };
            let prices = closes(&[("AAA", 100.0 * drift), ("BBB", 50.0 * drift)]);
            pipeline.engine.update_returns(&prices);
        }
        pipeline
    }

    #[test]
    fn tick_runs_cancellation_before_new_orders() {
        // CheckCount policy with threshold 1: any order open at the next
        // day's pass is cancelled.
        let config = ExecutionConfig {
            cancel_policy: CancelPolicy::CheckCount,
            limit_cancel_after_open_checks: 1,
            ..ExecutionConfig::default()
        };
        let mut pipeline = warmed_pipeline(config);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        let prices = closes(&[("AAA", 100.0), ("BBB", 50.0)]);
        let day0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let signals = vec![signal("AAA", Direction::Up, 0.8, day0)];

        let out = pipeline.on_data(DailyInputs {
            date: day0,
            closes: &prices,
            holdings: &holdings,
            signals: &signals,
        });
        assert!(out.rebalanced);
        assert!(out.cancellations.is_empty());
        assert_eq!(out.orders.len(), 1);
        let first_id = out.orders[0].id;

        let day1 = day0 + chrono::Duration::days(1);
        let out = pipeline.on_data(DailyInputs {
            date: day1,
            closes: &prices,
            holdings: &holdings,
            signals: &signals,
        });
        // Yesterday's unfilled order is cancelled before today's is placed.
        assert_eq!(out.cancellations, vec![first_id]);
        assert_eq!(out.orders.len(), 1);
        assert_ne!(out.orders[0].id, first_id);
    }

    #[test]
    fn desired_weights_flow_into_tagged_orders() {
        let mut pipeline = warmed_pipeline(ExecutionConfig::default());
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        let prices = closes(&[("AAA", 100.0), ("BBB", 50.0)]);
        let day0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let signals = vec![
            signal("AAA", Direction::Up, 0.8, day0),
            signal("BBB", Direction::Down, 0.2, day0),
        ];

        let out = pipeline.on_data(DailyInputs {
            date: day0,
            closes: &prices,
            holdings: &holdings,
            signals: &signals,
        });
        assert_eq!(out.desired_weights.len(), 2);
        assert_eq!(out.orders.len(), 2);
        for order in &out.orders {
            assert_eq!(order.tag.week_id, Some(crate::domain::WeekId("2024-01-02".into())));
            assert_eq!(order.tag.scale_day, Some(0));
        }
        let aaa = out.orders.iter().find(|o| o.symbol == "AAA").unwrap();
        assert_eq!(aaa.tag.tier, crate::domain::SignalTier::Strong);
        let bbb = out.orders.iter().find(|o| o.symbol == "BBB").unwrap();
        assert_eq!(bbb.tag.tier, crate::domain::SignalTier::Weak);
        assert!(bbb.quantity < 0.0);
    }

    #[test]
    fn universe_removal_cancels_open_orders_and_evicts_state() {
        let mut pipeline = warmed_pipeline(ExecutionConfig::default());
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        let prices = closes(&[("AAA", 100.0)]);
        let day0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let signals = vec![signal("AAA", Direction::Up, 0.8, day0)];
        pipeline.on_data(DailyInputs {
            date: day0,
            closes: &prices,
            holdings: &holdings,
            signals: &signals,
        });
        assert_eq!(pipeline.execution().open_order_count(), 1);

        let cancels = pipeline.on_symbol_removed("AAA");
        assert_eq!(cancels.len(), 1);
        assert_eq!(pipeline.execution().open_order_count(), 0);
        assert!(pipeline.engine().state().weekly_targets.is_empty());
    }
}
