//! Portfolio construction engine — the once-per-day target pass and its
//! supporting pieces.
//!
//! The daily sequence, run by `DailyPipeline`:
//!
//! 1. Return-window update from today's closes
//! 2. Stale-order cancellation (week-cycle rule, check-count fallback)
//! 3. Rebalance detection, target recomputation, classification
//! 4. Scale-state transitions and target emission

pub mod classify;
pub mod config;
pub mod pipeline;
pub mod portfolio;
pub mod report;
pub mod schedule;
pub mod state;
pub mod targets;

pub use classify::{classify_symbols, Classification};
pub use config::{ConfigError, EngineConfig};
pub use pipeline::{DailyInputs, DailyPipeline, DayOutput};
pub use portfolio::{CycleInfo, DesiredWeight, PortfolioEngine, TickOutcome};
pub use report::{daily_target_state, TargetStateRow};
pub use schedule::{build_scaling_schedule, ScheduleSet};
pub use state::{EngineState, ScaleState, WeekPlan};
pub use targets::{compute_weekly_targets, TargetComputation};
