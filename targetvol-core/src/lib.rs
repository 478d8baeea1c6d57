//! TargetVol Core — target-volatility portfolio construction and signal-aware execution.
//!
//! This crate contains the heart of the strategy engine:
//! - Domain types (signals, orders, holdings snapshots, cycle identifiers)
//! - Rolling return windows and a diagonal portfolio volatility estimator
//! - Weight normalization with per-name / gross / net exposure caps
//! - Rebalance classification (NEW_ENTRY / FLIP / RESIZE / HOLD / EXIT)
//! - Multi-day scale-in schedules with signal-strength-dependent pace
//! - Daily target emission and the order lifecycle / stale-order canceller
//!
//! The crate performs no I/O. Market data, signal generation, and order
//! routing are collaborators wired up by the host (see `targetvol-runner`).

pub mod domain;
pub mod engine;
pub mod execution;
pub mod risk;
