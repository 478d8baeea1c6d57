//! Simulation harness for the target-volatility strategy engine.
//!
//! Wires the engine and execution model to a synthetic market:
//! - `config`: serializable run configuration with a content-addressed run id
//! - `data`: deterministic synthetic daily closes
//! - `signals`: composite trend-signal generator
//! - `sim`: simulated broker (fills, cancels, account state)
//! - `runner`: the day-by-day driver loop

pub mod config;
pub mod data;
pub mod runner;
pub mod signals;
pub mod sim;

pub use config::{RunConfig, RunId, SignalConfig};
pub use runner::{run_simulation, RunError, RunSummary};

/// Install a tracing subscriber honoring `RUST_LOG`, for binaries and
/// ad-hoc harness use. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
