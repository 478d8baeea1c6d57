//! Signal-strength execution model.
//!
//! Converts desired-weight instructions into order requests, choosing order
//! aggressiveness by signal strength (strong → limit at market, moderate →
//! 0.5% offset, weak → 1.5% offset, position-closing → market), and keeps the
//! open-order book that the stale-order canceller works from.
//!
//! Cycle state (week id, per-symbol scale day and signal strength) is read
//! from an injected `CycleView` — never looked up through the host.

use super::cancel::{should_cancel_legacy, should_cancel_week_cycle, CancelPolicy};
use super::pricing::{compute_limit_price, offset_for_tier, OffsetConfig};
use crate::domain::{
    HoldingsSnapshot, OrderEvent, OrderId, OrderKind, OrderRequest, OrderStatus, OrderTag,
    OrderTicket, SignalTier, Symbol, WeekId,
};
use crate::engine::{CycleInfo, DesiredWeight};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Fraction of an existing position an order must close for the order to be
/// treated as an exit (always a market order).
const EXIT_CLOSE_FRACTION: f64 = 0.01;

/// Recoverable conditions surfaced to the caller alongside the day's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionWarning {
    /// The engine had no current cycle identifier; the whole cancellation
    /// pass fell back to the check-count rule.
    MissingCycleIdentifier,
    /// One order carried no week id; it was checked under the fallback rule.
    MissingOrderWeekId { order_id: OrderId },
}

/// Execution model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Signal strength at or above which orders use the strong tier.
    pub strong_threshold: f64,
    /// Signal strength at or above which orders use the moderate tier.
    pub moderate_threshold: f64,
    #[serde(flatten)]
    pub offsets: OffsetConfig,
    /// Strength assumed for symbols with no recorded signal.
    pub default_signal_strength: f64,
    /// Check-count cancellation threshold for the fallback rule.
    pub limit_cancel_after_open_checks: u32,
    pub cancel_policy: CancelPolicy,
    /// Per-symbol minimum price variation; absent symbols round to cents.
    pub tick_sizes: HashMap<Symbol, f64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 0.70,
            moderate_threshold: 0.30,
            offsets: OffsetConfig::default(),
            default_signal_strength: 0.5,
            limit_cancel_after_open_checks: 2,
            cancel_policy: CancelPolicy::default(),
            tick_sizes: HashMap::new(),
        }
    }
}

/// Execution model: order generation plus open-order lifecycle tracking.
pub struct SignalExecutionModel {
    config: ExecutionConfig,
    next_order_id: u64,
    /// Open limit tickets by id. Market orders are fire-and-forget — they
    /// never go stale. BTreeMap keeps passes deterministic.
    open: BTreeMap<OrderId, OrderTicket>,
}

impl SignalExecutionModel {
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            next_order_id: 1,
            open: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Currently tracked open limit tickets.
    pub fn open_orders(&self) -> impl Iterator<Item = &OrderTicket> {
        self.open.values()
    }

    pub fn open_order_count(&self) -> usize {
        self.open.len()
    }

    /// Turn the day's desired weights into order requests.
    ///
    /// Quantity is the gap between the targeted value and what is already
    /// held or on order; whole-share truncation means tiny gaps produce no
    /// order at all.
    pub fn execute(
        &mut self,
        desired: &[DesiredWeight],
        view: &dyn CycleInfo,
        holdings: &HoldingsSnapshot,
        closes: &HashMap<Symbol, f64>,
    ) -> Vec<OrderRequest> {
        let mut requests = Vec::new();

        for instruction in desired {
            let symbol = &instruction.symbol;
            let Some(&price) = closes.get(symbol) else {
                continue;
            };
            if price <= 0.0 {
                continue;
            }

            let held_qty = holdings
                .holdings
                .get(symbol)
                .filter(|h| h.invested)
                .map_or(0.0, |h| h.quantity);
            let on_order_qty: f64 = self
                .open
                .values()
                .filter(|t| &t.symbol == symbol)
                .map(OrderTicket::remaining_quantity)
                .sum();

            let target_qty = instruction.weight * holdings.nav / price;
            let unordered_qty = (target_qty - held_qty - on_order_qty).trunc();
            if unordered_qty == 0.0 {
                continue;
            }

            let is_exit = held_qty != 0.0
                && (held_qty + unordered_qty).abs() < held_qty.abs() * EXIT_CLOSE_FRACTION;

            let signal_strength = view
                .signal_strength(symbol)
                .unwrap_or(self.config.default_signal_strength);
            let week_id = view.week_id().cloned();
            let scale_day = view.scale_day(symbol);

            let id = self.allocate_id();
            let request = if is_exit {
                let tag = OrderTag {
                    tier: SignalTier::Exit,
                    signal_strength,
                    week_id,
                    scale_day,
                };
                OrderRequest {
                    id,
                    symbol: symbol.clone(),
                    quantity: unordered_qty,
                    kind: OrderKind::Market,
                    tag,
                }
            } else {
                let tier = SignalTier::from_strength_with(
                    signal_strength,
                    self.config.strong_threshold,
                    self.config.moderate_threshold,
                );
                let tick_size = self.config.tick_sizes.get(symbol).copied().unwrap_or(0.0);
                let offset = offset_for_tier(tier, &self.config.offsets);
                let limit_price = compute_limit_price(price, unordered_qty, offset, tick_size);

                self.open.insert(
                    id,
                    OrderTicket {
                        id,
                        symbol: symbol.clone(),
                        tier,
                        quantity: unordered_qty,
                        filled_quantity: 0.0,
                        status: OrderStatus::Submitted,
                        submit_price: price,
                        week_id: week_id.clone(),
                        scale_day,
                        open_checks: 0,
                    },
                );

                let tag = OrderTag {
                    tier,
                    signal_strength,
                    week_id,
                    scale_day,
                };
                OrderRequest {
                    id,
                    symbol: symbol.clone(),
                    quantity: unordered_qty,
                    kind: OrderKind::Limit { limit_price },
                    tag,
                }
            };
            requests.push(request);
        }

        requests
    }

    /// The daily stale-order pass. Returns ids to cancel (already purged from
    /// the book) and any warnings raised along the way.
    pub fn cancel_stale_orders(
        &mut self,
        current_week_id: Option<&WeekId>,
    ) -> (Vec<OrderId>, Vec<ExecutionWarning>) {
        let mut warnings = Vec::new();

        let to_cancel = match (self.config.cancel_policy, current_week_id) {
            (CancelPolicy::CheckCount, _) => self.legacy_pass(),
            (CancelPolicy::WeekCycle, None) => {
                warn!("current week id unavailable, falling back to check-count cancellation");
                warnings.push(ExecutionWarning::MissingCycleIdentifier);
                self.legacy_pass()
            }
            (CancelPolicy::WeekCycle, Some(current)) => {
                let max_checks = self.config.limit_cancel_after_open_checks;
                let mut stale = Vec::new();
                for ticket in self.open.values_mut() {
                    if !ticket.status.is_open() {
                        continue;
                    }
                    if ticket.week_id.is_none() {
                        warnings.push(ExecutionWarning::MissingOrderWeekId { order_id: ticket.id });
                        ticket.open_checks += 1;
                        if should_cancel_legacy(ticket.open_checks, max_checks) {
                            debug!(order_id = %ticket.id, symbol = %ticket.symbol,
                                checks = ticket.open_checks, "cancelling stale order (fallback rule)");
                            stale.push(ticket.id);
                        }
                        continue;
                    }
                    if should_cancel_week_cycle(ticket.week_id.as_ref(), current) {
                        debug!(order_id = %ticket.id, symbol = %ticket.symbol,
                            order_week = ?ticket.week_id, current_week = %current,
                            "cancelling order from previous cycle");
                        stale.push(ticket.id);
                    }
                }
                stale
            }
        };

        for id in &to_cancel {
            self.open.remove(id);
        }
        (to_cancel, warnings)
    }

    /// Apply a fill/cancel/reject event. Unknown order ids are ignored, so
    /// duplicate terminal events are no-ops.
    pub fn on_order_event(&mut self, event: &OrderEvent) {
        let Some(ticket) = self.open.get_mut(&event.order_id) else {
            debug!(order_id = %event.order_id, symbol = %event.symbol,
                "order event for untracked order, ignoring");
            return;
        };

        if event.status.is_terminal() {
            self.open.remove(&event.order_id);
            return;
        }
        ticket.filled_quantity += event.fill_quantity;
        ticket.status = event.status;
    }

    /// A symbol left the universe: purge its tickets and return the ids that
    /// still need a venue-side cancellation.
    pub fn on_symbol_removed(&mut self, symbol: &str) -> Vec<OrderId> {
        let removed: Vec<OrderId> = self
            .open
            .values()
            .filter(|t| t.symbol == symbol)
            .map(|t| t.id)
            .collect();
        let mut to_cancel = Vec::new();
        for id in &removed {
            if let Some(ticket) = self.open.remove(id) {
                if ticket.status.is_open() {
                    to_cancel.push(ticket.id);
                }
            }
        }
        to_cancel
    }

    fn legacy_pass(&mut self) -> Vec<OrderId> {
        let max_checks = self.config.limit_cancel_after_open_checks;
        let mut stale = Vec::new();
        for ticket in self.open.values_mut() {
            if !ticket.status.is_open() {
                continue;
            }
            ticket.open_checks += 1;
            if should_cancel_legacy(ticket.open_checks, max_checks) {
                debug!(order_id = %ticket.id, symbol = %ticket.symbol,
                    checks = ticket.open_checks, "cancelling stale order (check count)");
                stale.push(ticket.id);
            }
        }
        stale
    }

    fn allocate_id(&mut self) -> OrderId {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Holding;

    struct StubCycle {
        week_id: Option<WeekId>,
        strengths: HashMap<Symbol, f64>,
        scale_days: HashMap<Symbol, usize>,
    }

    impl StubCycle {
        fn new(week_id: &str) -> Self {
            Self {
                week_id: Some(WeekId(week_id.into())),
                strengths: HashMap::new(),
                scale_days: HashMap::new(),
            }
        }

        fn without_week() -> Self {
            Self {
                week_id: None,
                strengths: HashMap::new(),
                scale_days: HashMap::new(),
            }
        }

        fn with_strength(mut self, symbol: &str, strength: f64) -> Self {
            self.strengths.insert(symbol.into(), strength);
            self.scale_days.insert(symbol.into(), 0);
            self
        }
    }

    impl CycleInfo for StubCycle {
        fn week_id(&self) -> Option<&WeekId> {
            self.week_id.as_ref()
        }

        fn scale_day(&self, symbol: &str) -> Option<usize> {
            self.scale_days.get(symbol).copied()
        }

        fn signal_strength(&self, symbol: &str) -> Option<f64> {
            self.strengths.get(symbol).copied()
        }
    }

    fn desired(symbol: &str, weight: f64) -> Vec<DesiredWeight> {
        vec![DesiredWeight {
            symbol: symbol.into(),
            weight,
        }]
    }

    fn closes(pairs: &[(&str, f64)]) -> HashMap<Symbol, f64> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn strong_signal_places_limit_at_market() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02").with_strength("AAA", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);

        let requests = model.execute(
            &desired("AAA", 0.05),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].quantity, 500.0);
        assert_eq!(
            requests[0].kind,
            OrderKind::Limit { limit_price: 100.0 }
        );
        assert_eq!(requests[0].tag.tier, SignalTier::Strong);
        assert_eq!(requests[0].tag.week_id, Some(WeekId("2024-01-02".into())));
        assert_eq!(model.open_order_count(), 1);
    }

    #[test]
    fn weak_signal_prices_wide_of_market() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02").with_strength("AAA", 0.2);
        let holdings = HoldingsSnapshot::new(1_000_000.0);

        let requests = model.execute(
            &desired("AAA", 0.05),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );
        // Buy limit 1.5% below market.
        assert_eq!(requests[0].kind, OrderKind::Limit { limit_price: 98.5 });
        assert_eq!(requests[0].tag.tier, SignalTier::Weak);
    }

    #[test]
    fn position_close_is_market_order_and_untracked() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02");
        let mut holdings = HoldingsSnapshot::new(1_000_000.0);
        holdings.holdings.insert(
            "AAA".into(),
            Holding {
                quantity: 500.0,
                price: 100.0,
                invested: true,
            },
        );

        let requests = model.execute(
            &desired("AAA", 0.0),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].quantity, -500.0);
        assert_eq!(requests[0].kind, OrderKind::Market);
        assert_eq!(requests[0].tag.tier, SignalTier::Exit);
        assert_eq!(model.open_order_count(), 0);
    }

    #[test]
    fn open_orders_count_against_unordered_quantity() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02").with_strength("AAA", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        let prices = closes(&[("AAA", 100.0)]);

        let first = model.execute(&desired("AAA", 0.05), &view, &holdings, &prices);
        assert_eq!(first.len(), 1);
        // Same instruction again while the first order is still working.
        let second = model.execute(&desired("AAA", 0.05), &view, &holdings, &prices);
        assert!(second.is_empty());
    }

    #[test]
    fn sub_share_gap_produces_no_order() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02").with_strength("AAA", 0.85);
        let mut holdings = HoldingsSnapshot::new(1_000_000.0);
        holdings.holdings.insert(
            "AAA".into(),
            Holding {
                quantity: 500.0,
                price: 100.0,
                invested: true,
            },
        );

        // Target 500.9 shares vs 500 held: gap truncates to zero.
        let requests = model.execute(
            &desired("AAA", 0.05009),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );
        assert!(requests.is_empty());
    }

    #[test]
    fn week_cycle_cancels_previous_cycle_only() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02").with_strength("AAA", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        model.execute(
            &desired("AAA", 0.05),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );

        // Same cycle: the order runs the scale-in window uninterrupted.
        let current = WeekId("2024-01-02".into());
        let (cancelled, warnings) = model.cancel_stale_orders(Some(&current));
        assert!(cancelled.is_empty());
        assert!(warnings.is_empty());

        // Cycle advances: the order is now stale and gets purged.
        let next = WeekId("2024-01-09".into());
        let (cancelled, warnings) = model.cancel_stale_orders(Some(&next));
        assert_eq!(cancelled.len(), 1);
        assert!(warnings.is_empty());
        assert_eq!(model.open_order_count(), 0);
    }

    #[test]
    fn missing_cycle_identifier_falls_back_to_check_count() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::without_week().with_strength("AAA", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        model.execute(
            &desired("AAA", 0.05),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );

        let (cancelled, warnings) = model.cancel_stale_orders(None);
        assert!(cancelled.is_empty());
        assert_eq!(warnings, vec![ExecutionWarning::MissingCycleIdentifier]);

        // Default threshold is 2: the second daily check cancels.
        let (cancelled, _) = model.cancel_stale_orders(None);
        assert_eq!(cancelled.len(), 1);
        assert_eq!(model.open_order_count(), 0);
    }

    #[test]
    fn order_without_week_id_uses_per_order_fallback() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::without_week().with_strength("AAA", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        model.execute(
            &desired("AAA", 0.05),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );

        // The engine has a cycle id, but this order predates week tracking.
        let current = WeekId("2024-01-09".into());
        let (cancelled, warnings) = model.cancel_stale_orders(Some(&current));
        assert!(cancelled.is_empty());
        assert!(matches!(
            warnings[0],
            ExecutionWarning::MissingOrderWeekId { .. }
        ));
        let (cancelled, _) = model.cancel_stale_orders(Some(&current));
        assert_eq!(cancelled.len(), 1);
    }

    #[test]
    fn check_count_policy_ignores_week_ids() {
        let config = ExecutionConfig {
            cancel_policy: CancelPolicy::CheckCount,
            ..ExecutionConfig::default()
        };
        let mut model = SignalExecutionModel::new(config);
        let view = StubCycle::new("2024-01-02").with_strength("AAA", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        model.execute(
            &desired("AAA", 0.05),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );

        // Week id matches the current cycle, but the policy counts checks.
        let current = WeekId("2024-01-02".into());
        let (cancelled, _) = model.cancel_stale_orders(Some(&current));
        assert!(cancelled.is_empty());
        let (cancelled, _) = model.cancel_stale_orders(Some(&current));
        assert_eq!(cancelled.len(), 1);
    }

    #[test]
    fn terminal_events_are_idempotent() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02").with_strength("AAA", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        let requests = model.execute(
            &desired("AAA", 0.05),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );

        let fill = OrderEvent {
            order_id: requests[0].id,
            symbol: "AAA".into(),
            status: OrderStatus::Filled,
            fill_quantity: 500.0,
            fill_price: Some(100.0),
        };
        model.on_order_event(&fill);
        assert_eq!(model.open_order_count(), 0);
        // Duplicate delivery must be a no-op.
        model.on_order_event(&fill);
        assert_eq!(model.open_order_count(), 0);
    }

    #[test]
    fn partial_fill_keeps_ticket_open_with_updated_quantity() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02").with_strength("AAA", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        let requests = model.execute(
            &desired("AAA", 0.05),
            &view,
            &holdings,
            &closes(&[("AAA", 100.0)]),
        );

        model.on_order_event(&OrderEvent {
            order_id: requests[0].id,
            symbol: "AAA".into(),
            status: OrderStatus::PartiallyFilled,
            fill_quantity: 200.0,
            fill_price: Some(100.0),
        });
        let ticket = model.open_orders().next().unwrap();
        assert_eq!(ticket.status, OrderStatus::PartiallyFilled);
        assert_eq!(ticket.remaining_quantity(), 300.0);
    }

    #[test]
    fn symbol_removal_purges_and_requests_cancels() {
        let mut model = SignalExecutionModel::new(ExecutionConfig::default());
        let view = StubCycle::new("2024-01-02")
            .with_strength("AAA", 0.85)
            .with_strength("BBB", 0.85);
        let holdings = HoldingsSnapshot::new(1_000_000.0);
        let mut instructions = desired("AAA", 0.05);
        instructions.extend(desired("BBB", 0.05));
        model.execute(
            &instructions,
            &view,
            &holdings,
            &closes(&[("AAA", 100.0), ("BBB", 50.0)]),
        );
        assert_eq!(model.open_order_count(), 2);

        let to_cancel = model.on_symbol_removed("AAA");
        assert_eq!(to_cancel.len(), 1);
        assert_eq!(model.open_order_count(), 1);
        assert_eq!(model.open_orders().next().unwrap().symbol, "BBB");
    }
}
