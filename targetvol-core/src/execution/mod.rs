//! Execution layer: order generation by signal strength, open-order
//! lifecycle tracking, and the stale-order canceller.

pub mod cancel;
pub mod model;
pub mod pricing;

pub use cancel::{should_cancel_legacy, should_cancel_week_cycle, CancelPolicy};
pub use model::{ExecutionConfig, ExecutionWarning, SignalExecutionModel};
pub use pricing::{compute_limit_price, offset_for_tier, OffsetConfig};
