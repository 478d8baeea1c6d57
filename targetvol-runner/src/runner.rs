//! The day-by-day driver loop.
//!
//! One iteration per trading day, in venue order: sweep resting limit
//! orders against the new close, snapshot the account, generate signals,
//! tick the strategy pipeline, then apply its cancellations and orders back
//! to the broker.

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data::{generate_market, MarketData};
use crate::signals::compute_signal;
use crate::sim::SimBroker;
use serde::{Deserialize, Serialize};
use targetvol_core::domain::Signal;
use targetvol_core::engine::{daily_target_state, DailyInputs, DailyPipeline, TargetStateRow};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("empty trading calendar for {start}..{end}")]
    EmptyCalendar {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// Aggregate result of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub trading_days: usize,
    pub rebalances: usize,
    pub orders_placed: usize,
    pub orders_filled: usize,
    pub orders_cancelled: usize,
    pub warnings: usize,
    pub final_nav: f64,
    /// End-of-day NAV, one entry per trading day.
    pub equity_curve: Vec<f64>,
    /// Target-state report for the final day, sorted by symbol.
    pub final_target_state: Vec<TargetStateRow>,
}

/// Run a full simulation from a validated config.
pub fn run_simulation(config: &RunConfig) -> Result<RunSummary, RunError> {
    config.validate()?;
    let run_id = config.run_id();
    let market = generate_market(
        &config.universe,
        config.start_date,
        config.end_date,
        config.seed,
    );
    if market.dates.is_empty() {
        return Err(RunError::EmptyCalendar {
            start: config.start_date,
            end: config.end_date,
        });
    }
    info!(
        run_id = %run_id,
        days = market.dates.len(),
        universe = config.universe.len(),
        "starting simulation"
    );

    let mut pipeline = DailyPipeline::new(config.engine.clone(), config.execution.clone());
    let mut broker = SimBroker::new(config.initial_capital);
    let mut summary = RunSummary {
        run_id,
        trading_days: market.dates.len(),
        rebalances: 0,
        orders_placed: 0,
        orders_filled: 0,
        orders_cancelled: 0,
        warnings: 0,
        final_nav: config.initial_capital,
        equity_curve: Vec::with_capacity(market.dates.len()),
        final_target_state: Vec::new(),
    };

    for (index, &date) in market.dates.iter().enumerate() {
        let closes = market.closes_on(index);

        // Venue first: resting limits fill against the new close.
        for event in broker.mark(&closes) {
            summary.orders_filled += 1;
            pipeline.on_order_event(&event);
        }

        let holdings = broker.snapshot(&closes);
        let signals = daily_signals(config, &market, index, date);

        let output = pipeline.on_data(DailyInputs {
            date,
            closes: &closes,
            holdings: &holdings,
            signals: &signals,
        });
        if output.rebalanced {
            summary.rebalances += 1;
        }
        summary.warnings += output.warnings.len();

        for event in broker.cancel(&output.cancellations) {
            summary.orders_cancelled += 1;
            pipeline.on_order_event(&event);
        }
        summary.orders_placed += output.orders.len();
        for event in broker.submit(&output.orders, &closes) {
            if event.fill_quantity != 0.0 {
                summary.orders_filled += 1;
            }
            pipeline.on_order_event(&event);
        }

        let end_of_day = broker.snapshot(&closes);
        debug!(
            %date,
            nav = end_of_day.nav,
            open_orders = broker.open_order_count(),
            "day complete"
        );
        summary.equity_curve.push(end_of_day.nav);
    }

    let final_snapshot = broker.snapshot(&market.closes_on(market.dates.len() - 1));
    summary.final_nav = final_snapshot.nav;
    summary.final_target_state = daily_target_state(pipeline.engine(), &final_snapshot);
    info!(
        final_nav = summary.final_nav,
        rebalances = summary.rebalances,
        orders = summary.orders_placed,
        "simulation complete"
    );
    Ok(summary)
}

fn daily_signals(
    config: &RunConfig,
    market: &MarketData,
    index: usize,
    date: chrono::NaiveDate,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    for symbol in &config.universe {
        let series = &market.series[symbol];
        if let Some(signal) =
            compute_signal(&config.signal, symbol, &series.closes[..=index], date)
        {
            signals.push(signal);
        }
    }
    signals
}
