//! Rolling return tracker.
//!
//! Maintains a fixed-length window of daily simple returns per symbol,
//! computed incrementally from closing prices (`close / prev_close - 1`).
//! Oldest values are evicted silently once a window is full. Missing bars are
//! simply skipped for that day; there are no error conditions here.

use crate::domain::Symbol;
use std::collections::{HashMap, VecDeque};

/// Per-symbol rolling return windows plus previous-close bookkeeping.
#[derive(Debug, Clone)]
pub struct ReturnTracker {
    lookback: usize,
    windows: HashMap<Symbol, VecDeque<f64>>,
    prev_close: HashMap<Symbol, f64>,
}

impl ReturnTracker {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "return lookback must be >= 1");
        Self {
            lookback,
            windows: HashMap::new(),
            prev_close: HashMap::new(),
        }
    }

    /// Record today's close for a symbol. Appends a return once a previous
    /// close exists, evicting the oldest observation when the window is full.
    pub fn on_close(&mut self, symbol: &str, close: f64) {
        if let Some(&prev) = self.prev_close.get(symbol) {
            if prev > 0.0 {
                let daily_return = close / prev - 1.0;
                let window = self
                    .windows
                    .entry(symbol.to_string())
                    .or_insert_with(|| VecDeque::with_capacity(self.lookback));
                if window.len() == self.lookback {
                    window.pop_front();
                }
                window.push_back(daily_return);
            }
        }
        self.prev_close.insert(symbol.to_string(), close);
    }

    /// Number of observations held for a symbol.
    pub fn observations(&self, symbol: &str) -> usize {
        self.windows.get(symbol).map_or(0, VecDeque::len)
    }

    /// The return window for a symbol, oldest first.
    pub fn window(&self, symbol: &str) -> Option<&VecDeque<f64>> {
        self.windows.get(symbol)
    }

    /// Start tracking a symbol (idempotent).
    pub fn track(&mut self, symbol: &str) {
        self.windows
            .entry(symbol.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.lookback));
    }

    /// Evict all state for a symbol that left the universe.
    pub fn remove(&mut self, symbol: &str) {
        self.windows.remove(symbol);
        self.prev_close.remove(symbol);
    }

    pub fn tracked_symbols(&self) -> impl Iterator<Item = &String> {
        self.windows.keys()
    }
}
