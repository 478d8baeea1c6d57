//! Stale-order cancellation decisions.
//!
//! Primary rule: an open order from an earlier rebalance cycle (its week id
//! lexicographically below the engine's current week id) is stale. Orders
//! from the current cycle run the full scale-in window uninterrupted.
//! Fallback rule: count consecutive daily checks and cancel at a threshold —
//! used when the cycle identifier is unavailable, or always under
//! `CancelPolicy::CheckCount`.

use crate::domain::WeekId;
use serde::{Deserialize, Serialize};

/// Which staleness rule governs the daily cancellation pass.
///
/// The two rules disagree on worst-case staleness tolerance (a week-cycle
/// order may live for the whole rebalance interval; a check-count order lives
/// `limit_cancel_after_open_checks` days), so the choice is explicit
/// configuration rather than a silent pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Week-cycle rule, with the check-count rule as a per-order fallback for
    /// orders that carry no week id, and as a whole-pass fallback when the
    /// engine has no current cycle identifier.
    #[default]
    WeekCycle,
    /// Check-count rule only.
    CheckCount,
}

/// Week-cycle rule: stale when the order's cycle predates the current one.
/// Missing identifiers on either side never cancel here — that is the
/// fallback rule's job.
pub fn should_cancel_week_cycle(order_week_id: Option<&WeekId>, current_week_id: &WeekId) -> bool {
    match order_week_id {
        Some(order_week) => order_week < current_week_id,
        None => false,
    }
}

/// Legacy rule: stale once the order has survived `max_checks` daily checks.
pub fn should_cancel_legacy(check_count: u32, max_checks: u32) -> bool {
    check_count >= max_checks
}
