//! Order types, the order-ticket state machine, and the structured audit tag.

use super::ids::{OrderId, WeekId};
use super::signal::SignalTier;
use super::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of order and its price parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Fill at the prevailing market price. Used for exits.
    Market,
    /// Fill at limit price or better.
    Limit { limit_price: f64 },
}

/// Order lifecycle states: `Submitted → {PartiallyFilled ↔ Submitted} →
/// {Filled | Canceled | Invalid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Accepted by the venue, no fills yet.
    Submitted,
    /// Some quantity filled, remainder still working.
    PartiallyFilled,
    /// Completely filled. Terminal.
    Filled,
    /// Cancelled before completion. Terminal.
    Canceled,
    /// Rejected or otherwise unusable. Terminal.
    Invalid,
}

impl OrderStatus {
    /// Cancellation is only attempted from an open state.
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Submitted | OrderStatus::PartiallyFilled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Invalid
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Submitted => "Submitted",
            OrderStatus::PartiallyFilled => "PartiallyFilled",
            OrderStatus::Filled => "Filled",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Invalid => "Invalid",
        };
        write!(f, "{s}")
    }
}

/// Execution metadata attached to every outgoing order.
///
/// Carried as a structured record internally; the delimited string form is
/// generated only at the boundary, for audit-log compatibility
/// (`tier=<tier>;signal=<signal>;week_id=<week_id>;scale_day=<scale_day>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTag {
    pub tier: SignalTier,
    pub signal_strength: f64,
    pub week_id: Option<WeekId>,
    pub scale_day: Option<usize>,
}

impl OrderTag {
    /// Render the legacy delimited tag string.
    pub fn to_tag_string(&self) -> String {
        format!(
            "tier={};signal={:.4};week_id={};scale_day={}",
            self.tier.as_str(),
            self.signal_strength,
            self.week_id.as_ref().map(WeekId::as_str).unwrap_or(""),
            self.scale_day.map(|d| d.to_string()).unwrap_or_default(),
        )
    }

    /// Extract a week id from a delimited tag string. Returns `None` when the
    /// field is absent or empty.
    pub fn week_id_from_tag(tag: &str) -> Option<WeekId> {
        for field in tag.split(';') {
            if let Some(value) = field.strip_prefix("week_id=") {
                let value = value.trim();
                if value.is_empty() {
                    return None;
                }
                return Some(WeekId(value.to_string()));
            }
        }
        None
    }
}

/// A request the engine hands to the order-routing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub id: OrderId,
    pub symbol: Symbol,
    /// Signed quantity: positive = buy, negative = sell.
    pub quantity: f64,
    pub kind: OrderKind,
    pub tag: OrderTag,
}

/// A fill/cancel/reject notification from the execution venue.
///
/// Events are independent, idempotent updates keyed by order id: applying the
/// same terminal event twice must be a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub status: OrderStatus,
    pub fill_quantity: f64,
    pub fill_price: Option<f64>,
}

/// A tracked open order in the execution model's book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub id: OrderId,
    pub symbol: Symbol,
    pub tier: SignalTier,
    pub quantity: f64,
    pub filled_quantity: f64,
    pub status: OrderStatus,
    /// Market price when the order was submitted, for slippage audit.
    pub submit_price: f64,
    /// Rebalance cycle that produced this order. `None` when the engine had
    /// no cycle yet; such orders fall back to the check-count rule.
    pub week_id: Option<WeekId>,
    pub scale_day: Option<usize>,
    /// Consecutive daily stale checks this order has survived.
    pub open_checks: u32,
}

impl OrderTicket {
    pub fn remaining_quantity(&self) -> f64 {
        self.quantity - self.filled_quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_open_and_terminal() {
        assert!(OrderStatus::Submitted.is_open());
        assert!(OrderStatus::PartiallyFilled.is_open());
        assert!(!OrderStatus::Filled.is_open());
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Invalid.is_terminal());
        assert!(!OrderStatus::Submitted.is_terminal());
    }

    #[test]
    fn tag_string_round_trip() {
        let tag = OrderTag {
            tier: SignalTier::Moderate,
            signal_strength: 0.4512,
            week_id: Some(WeekId("2024-01-02".into())),
            scale_day: Some(3),
        };
        let s = tag.to_tag_string();
        assert_eq!(s, "tier=moderate;signal=0.4512;week_id=2024-01-02;scale_day=3");
        assert_eq!(
            OrderTag::week_id_from_tag(&s),
            Some(WeekId("2024-01-02".into()))
        );
    }

    #[test]
    fn tag_without_week_id_parses_to_none() {
        let tag = OrderTag {
            tier: SignalTier::Exit,
            signal_strength: 0.5,
            week_id: None,
            scale_day: None,
        };
        let s = tag.to_tag_string();
        assert_eq!(OrderTag::week_id_from_tag(&s), None);
        assert_eq!(OrderTag::week_id_from_tag("not a tag"), None);
    }

    #[test]
    fn ticket_remaining_quantity() {
        let ticket = OrderTicket {
            id: OrderId(7),
            symbol: "SPY".into(),
            tier: SignalTier::Strong,
            quantity: 100.0,
            filled_quantity: 30.0,
            status: OrderStatus::PartiallyFilled,
            submit_price: 412.5,
            week_id: None,
            scale_day: None,
            open_checks: 0,
        };
        assert_eq!(ticket.remaining_quantity(), 70.0);
    }
}
