//! Simulated broker.
//!
//! Fills market orders at the day's close and rests limit orders until the
//! close crosses the limit. No slippage or commission model; fills are
//! always complete. The broker owns cash and positions and reports them as
//! a `HoldingsSnapshot` for the engine.

use std::collections::HashMap;
use targetvol_core::domain::{
    Holding, HoldingsSnapshot, OrderEvent, OrderId, OrderKind, OrderRequest, OrderStatus, Symbol,
};

#[derive(Debug, Clone)]
struct RestingLimit {
    id: OrderId,
    symbol: Symbol,
    quantity: f64,
    limit_price: f64,
}

impl RestingLimit {
    /// Buys fill when the close is at or below the limit, sells at or above.
    fn crosses(&self, close: f64) -> bool {
        if self.quantity > 0.0 {
            close <= self.limit_price
        } else {
            close >= self.limit_price
        }
    }
}

/// In-memory venue: cash, positions, and the resting limit book.
#[derive(Debug, Clone)]
pub struct SimBroker {
    cash: f64,
    positions: HashMap<Symbol, f64>,
    resting: Vec<RestingLimit>,
}

impl SimBroker {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            positions: HashMap::new(),
            resting: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self, symbol: &str) -> f64 {
        self.positions.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn open_order_count(&self) -> usize {
        self.resting.len()
    }

    fn fill(&mut self, id: OrderId, symbol: &str, quantity: f64, price: f64) -> OrderEvent {
        self.cash -= quantity * price;
        let position = self.positions.entry(symbol.to_string()).or_insert(0.0);
        *position += quantity;
        if position.abs() < 1e-9 {
            self.positions.remove(symbol);
        }
        OrderEvent {
            order_id: id,
            symbol: symbol.to_string(),
            status: OrderStatus::Filled,
            fill_quantity: quantity,
            fill_price: Some(price),
        }
    }

    /// Sweep the resting book against today's closes. Run once per day
    /// before the strategy tick so fills land in the snapshot it reads.
    pub fn mark(&mut self, closes: &HashMap<Symbol, f64>) -> Vec<OrderEvent> {
        let mut events = Vec::new();
        let mut still_resting = Vec::new();
        for order in std::mem::take(&mut self.resting) {
            match closes.get(&order.symbol) {
                Some(&close) if order.crosses(close) => {
                    events.push(self.fill(
                        order.id,
                        &order.symbol,
                        order.quantity,
                        order.limit_price,
                    ));
                }
                _ => still_resting.push(order),
            }
        }
        self.resting = still_resting;
        events
    }

    /// Accept a batch of orders. Market orders (and limit orders already
    /// crossed by today's close) fill immediately; the rest go to the book.
    pub fn submit(
        &mut self,
        orders: &[OrderRequest],
        closes: &HashMap<Symbol, f64>,
    ) -> Vec<OrderEvent> {
        let mut events = Vec::new();
        for order in orders {
            let close = match closes.get(&order.symbol) {
                Some(&c) => c,
                None => {
                    events.push(OrderEvent {
                        order_id: order.id,
                        symbol: order.symbol.clone(),
                        status: OrderStatus::Invalid,
                        fill_quantity: 0.0,
                        fill_price: None,
                    });
                    continue;
                }
            };
            match order.kind {
                OrderKind::Market => {
                    events.push(self.fill(order.id, &order.symbol, order.quantity, close));
                }
                OrderKind::Limit { limit_price } => {
                    let resting = RestingLimit {
                        id: order.id,
                        symbol: order.symbol.clone(),
                        quantity: order.quantity,
                        limit_price,
                    };
                    if resting.crosses(close) {
                        events.push(self.fill(order.id, &order.symbol, order.quantity, close));
                    } else {
                        self.resting.push(resting);
                    }
                }
            }
        }
        events
    }

    /// Drop resting orders by id; returns a Canceled event per order found.
    pub fn cancel(&mut self, ids: &[OrderId]) -> Vec<OrderEvent> {
        let mut events = Vec::new();
        self.resting.retain(|order| {
            if ids.contains(&order.id) {
                events.push(OrderEvent {
                    order_id: order.id,
                    symbol: order.symbol.clone(),
                    status: OrderStatus::Canceled,
                    fill_quantity: 0.0,
                    fill_price: None,
                });
                false
            } else {
                true
            }
        });
        events
    }

    /// Account state marked at today's closes. Positions without a close
    /// today are marked at zero weight but keep their quantity.
    pub fn snapshot(&self, closes: &HashMap<Symbol, f64>) -> HoldingsSnapshot {
        let mut holdings = HashMap::new();
        let mut nav = self.cash;
        for (symbol, &quantity) in &self.positions {
            let price = closes.get(symbol).copied().unwrap_or(0.0);
            nav += quantity * price;
            holdings.insert(
                symbol.clone(),
                Holding {
                    quantity,
                    price,
                    invested: quantity.abs() > 1e-9,
                },
            );
        }
        HoldingsSnapshot { nav, holdings }
    }
}
