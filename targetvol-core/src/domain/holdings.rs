//! Holdings snapshot — the account state the engine reads, never mutates.

use super::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One symbol's holding as reported by the account layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Signed quantity: positive = long, negative = short.
    pub quantity: f64,
    pub price: f64,
    pub invested: bool,
}

impl Holding {
    pub fn market_value(&self) -> f64 {
        self.quantity * self.price
    }
}

/// Point-in-time snapshot of the account: NAV plus per-symbol holdings.
///
/// The engine snapshots actual weights from this *before* any mutation in a
/// rebalance cycle, so classification sees pre-cycle state (partial fills
/// from earlier days included).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    /// Net asset value — the normalization base for all weights.
    pub nav: f64,
    pub holdings: HashMap<Symbol, Holding>,
}

impl HoldingsSnapshot {
    pub fn new(nav: f64) -> Self {
        Self {
            nav,
            holdings: HashMap::new(),
        }
    }

    /// Current weight of one symbol as a fraction of NAV (0 when not invested
    /// or NAV is not positive).
    pub fn weight_of(&self, symbol: &str) -> f64 {
        if self.nav <= 0.0 {
            return 0.0;
        }
        match self.holdings.get(symbol) {
            Some(h) if h.invested => h.market_value() / self.nav,
            _ => 0.0,
        }
    }

    /// Weights of every invested symbol. Empty when NAV is not positive.
    pub fn actual_weights(&self) -> HashMap<Symbol, f64> {
        if self.nav <= 0.0 {
            return HashMap::new();
        }
        self.holdings
            .iter()
            .filter(|(_, h)| h.invested)
            .map(|(sym, h)| (sym.clone(), h.market_value() / self.nav))
            .collect()
    }

    /// Symbols currently invested.
    pub fn invested_symbols(&self) -> impl Iterator<Item = &String> {
        self.holdings
            .iter()
            .filter(|(_, h)| h.invested)
            .map(|(sym, _)| sym)
    }
}
