//! Composite trend-signal generator.
//!
//! Compares the latest close to short, medium, and long moving averages.
//! All three distances must agree on direction for a signal to fire;
//! strength is a tanh squash of the mean distance. Symbols with too little
//! history or with disagreeing averages produce no signal.

use crate::config::SignalConfig;
use chrono::NaiveDate;
use targetvol_core::domain::{Direction, Signal};

fn sma(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let tail = &closes[closes.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Signal for one symbol from its close history through today.
///
/// Returns `None` when history is shorter than the long window, when the
/// three averages disagree on direction, or when the squashed strength falls
/// below `min_magnitude`.
pub fn compute_signal(
    config: &SignalConfig,
    symbol: &str,
    closes: &[f64],
    date: NaiveDate,
) -> Option<Signal> {
    let close = *closes.last()?;
    if close <= 0.0 {
        return None;
    }
    let short = sma(closes, config.short_window)?;
    let medium = sma(closes, config.medium_window)?;
    let long = sma(closes, config.long_window)?;

    let distances = [
        (close - short) / close,
        (close - medium) / close,
        (close - long) / close,
    ];
    let all_up = distances.iter().all(|&d| d > 0.0);
    let all_down = distances.iter().all(|&d| d < 0.0);
    if !all_up && !all_down {
        return None;
    }

    let mean = distances.iter().sum::<f64>() / distances.len() as f64;
    let magnitude = (mean / config.temperature).tanh().abs();
    if magnitude < config.min_magnitude {
        return None;
    }

    Some(Signal {
        symbol: symbol.to_string(),
        direction: if all_up { Direction::Up } else { Direction::Down },
        magnitude,
        generated: date.and_hms_opt(0, 0, 0)?,
    })
}
