//! Deterministic synthetic daily closes.
//!
//! Each symbol gets its own BLAKE3-derived sub-seed from the master seed, so
//! price paths are identical regardless of universe order, and adding a
//! symbol never perturbs the others.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use targetvol_core::domain::Symbol;

/// One symbol's close series, aligned with the run's trading calendar.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub closes: Vec<f64>,
}

/// Synthetic market: a shared weekday calendar plus one series per symbol.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub dates: Vec<NaiveDate>,
    pub series: HashMap<Symbol, PriceSeries>,
}

impl MarketData {
    /// Closes for one calendar index across all symbols.
    pub fn closes_on(&self, index: usize) -> HashMap<Symbol, f64> {
        self.series
            .iter()
            .map(|(symbol, series)| (symbol.clone(), series.closes[index]))
            .collect()
    }
}

/// Weekday trading calendar between two dates, inclusive.
pub fn trading_calendar(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut date = start;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(date);
        }
        date += Duration::days(1);
    }
    dates
}

fn sub_seed(master_seed: u64, symbol: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(symbol.as_bytes());
    let hash = hasher.finalize();
    u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
}

/// Generate a trending random walk for one symbol.
///
/// Daily log-return = drift + noise, where the drift sign flips at random
/// intervals so the series has trending regimes for the signal generator to
/// pick up. Approximately 1% daily noise, 0.1% daily drift.
fn generate_series(symbol: &str, master_seed: u64, days: usize) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(sub_seed(master_seed, symbol));
    let mut closes = Vec::with_capacity(days);
    let mut price = 50.0 + rng.gen::<f64>() * 150.0;
    let mut drift = if rng.gen::<f64>() < 0.5 { 1.0e-3 } else { -1.0e-3 };
    let mut regime_left: u32 = 40 + (rng.gen::<f64>() * 80.0) as u32;

    for _ in 0..days {
        if regime_left == 0 {
            drift = -drift;
            regime_left = 40 + (rng.gen::<f64>() * 80.0) as u32;
        }
        regime_left -= 1;
        // Sum of 4 uniforms, centered: light-tailed noise with std ~ 0.01.
        let noise: f64 = (0..4).map(|_| rng.gen::<f64>() - 0.5).sum::<f64>() * 0.0173;
        price *= (drift + noise).exp();
        closes.push(price);
    }

    PriceSeries {
        symbol: symbol.to_string(),
        closes,
    }
}

/// Build the full synthetic market for a universe and date range.
pub fn generate_market(
    universe: &[String],
    start: NaiveDate,
    end: NaiveDate,
    master_seed: u64,
) -> MarketData {
    let dates = trading_calendar(start, end);
    let series = universe
        .iter()
        .map(|symbol| {
            (
                symbol.clone(),
                generate_series(symbol, master_seed, dates.len()),
            )
        })
        .collect();
    MarketData { dates, series }
}
