//! Rebalance classification.
//!
//! At each rebalance every symbol appearing in the new targets, the prior
//! targets, or the actual holdings gets exactly one label. Prior targets
//! carry direction/intent; actual weights carry the dead-band check, so
//! partial fills from the previous cycle are handled correctly.

use crate::domain::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Weight below which a holding is considered flat.
const HELD_EPS: f64 = 1e-8;

/// A symbol's required transition at a rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// New target, no prior target, not currently held.
    NewEntry,
    /// Direction reversal, against either the prior target or the holding.
    Flip,
    /// Same direction, deviation from actual exceeds the dead-band.
    Resize,
    /// Same direction, actual already within the dead-band of target.
    Hold,
    /// No new target but previously targeted or still held.
    Exit,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::NewEntry => "NEW_ENTRY",
            Classification::Flip => "FLIP",
            Classification::Resize => "RESIZE",
            Classification::Hold => "HOLD",
            Classification::Exit => "EXIT",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify every symbol present in any of the three input sets.
///
/// Symbols absent from all three are skipped entirely. The function is pure:
/// identical inputs always produce identical classifications.
pub fn classify_symbols(
    new_targets: &HashMap<Symbol, f64>,
    prior_targets: &HashMap<Symbol, f64>,
    actual_weights: &HashMap<Symbol, f64>,
    dead_band: f64,
) -> HashMap<Symbol, Classification> {
    let mut classifications = HashMap::new();

    let all_symbols: std::collections::HashSet<&String> = new_targets
        .keys()
        .chain(prior_targets.keys())
        .chain(actual_weights.keys())
        .collect();

    for symbol in all_symbols {
        let new_w = new_targets.get(symbol).copied().unwrap_or(0.0);
        let prior_w = prior_targets.get(symbol).copied().unwrap_or(0.0);
        let actual_w = actual_weights.get(symbol).copied().unwrap_or(0.0);

        let has_new_target = new_targets.contains_key(symbol);
        let was_targeted = prior_targets.contains_key(symbol);
        let is_held = actual_w.abs() > HELD_EPS;

        let classification = if has_new_target && !was_targeted && !is_held {
            Classification::NewEntry
        } else if has_new_target && !was_targeted && is_held {
            if (actual_w > 0.0) != (new_w > 0.0) {
                Classification::Flip
            } else {
                Classification::Resize
            }
        } else if !has_new_target && (was_targeted || is_held) {
            Classification::Exit
        } else if !has_new_target {
            continue;
        } else if (new_w > 0.0) != (prior_w > 0.0) {
            Classification::Flip
        } else if (new_w - actual_w).abs() <= dead_band {
            Classification::Hold
        } else {
            Classification::Resize
        };

        classifications.insert(symbol.clone(), classification);
    }

    classifications
}
