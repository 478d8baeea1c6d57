//! Domain types shared between the portfolio engine and the execution layer.

pub mod holdings;
pub mod ids;
pub mod order;
pub mod signal;

pub use holdings::{Holding, HoldingsSnapshot};
pub use ids::{OrderId, WeekId};
pub use order::{
    OrderEvent, OrderKind, OrderRequest, OrderStatus, OrderTag, OrderTicket,
};
pub use signal::{Direction, Signal, SignalTier};

/// Stable symbol key for all per-symbol maps.
pub type Symbol = String;
