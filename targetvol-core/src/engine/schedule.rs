//! Scale-in schedules.
//!
//! A schedule is a cumulative fraction per scale day. Entry i (1-indexed) is
//! `round((i/N)^(1/front_load_factor), 4)` with the final entry forced to
//! exactly 1.0. A front-load factor of 1.0 is linear; larger factors reach
//! full size faster in the early days.

use crate::domain::SignalTier;

/// Build one cumulative scaling schedule of length `scaling_days`.
pub fn build_scaling_schedule(scaling_days: usize, front_load_factor: f64) -> Vec<f64> {
    let n = scaling_days.max(1);
    if n == 1 {
        return vec![1.0];
    }

    let exponent = 1.0 / front_load_factor;
    let mut schedule: Vec<f64> = (1..=n)
        .map(|i| {
            let fraction = (i as f64 / n as f64).powf(exponent);
            (fraction * 10_000.0).round() / 10_000.0
        })
        .collect();
    // Rounding must not leave the final day short of full size.
    *schedule.last_mut().expect("n >= 1") = 1.0;
    schedule
}

/// The three per-tier schedules, precomputed once at engine construction.
///
/// Strong signals (flf 2.0) reach full size fastest, moderate (1.3) slower,
/// weak (1.0) linearly.
#[derive(Debug, Clone)]
pub struct ScheduleSet {
    strong: Vec<f64>,
    moderate: Vec<f64>,
    weak: Vec<f64>,
}

impl ScheduleSet {
    pub fn new(scaling_days: usize) -> Self {
        Self {
            strong: build_scaling_schedule(scaling_days, 2.0),
            moderate: build_scaling_schedule(scaling_days, 1.3),
            weak: build_scaling_schedule(scaling_days, 1.0),
        }
    }

    /// Schedule for a signal strength, tiered on abs(magnitude).
    pub fn select(&self, signal_strength: f64) -> &[f64] {
        match SignalTier::from_strength(signal_strength) {
            SignalTier::Strong => &self.strong,
            SignalTier::Moderate => &self.moderate,
            SignalTier::Weak | SignalTier::Exit => &self.weak,
        }
    }

    /// Cumulative fraction for a scale day, clamped to the schedule's last
    /// index.
    pub fn fraction(&self, signal_strength: f64, scale_day: usize) -> f64 {
        let schedule = self.select(signal_strength);
        schedule[scale_day.min(schedule.len() - 1)]
    }
}
