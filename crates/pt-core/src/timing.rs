//! Tick timing utilities.
//!
//! The scheduler measures each tick against its fixed period. `TickTimer`
//! measures a single tick; `TickStats` accumulates across a run.

use std::time::{Duration, Instant};

/// Measures one tick against the configured period.
pub struct TickTimer {
    start: Instant,
    period: Duration,
}

impl TickTimer {
    /// Start timing a tick with the given period.
    pub fn start(period: Duration) -> Self {
        Self {
            start: Instant::now(),
            period,
        }
    }

    /// Time spent since the tick started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Remaining time in the period, zero if the tick overran.
    pub fn remaining(&self) -> Duration {
        self.period.saturating_sub(self.elapsed())
    }
}

/// Accumulated tick statistics for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub ticks: u64,
    pub overruns: u64,
    pub total: Duration,
    pub max: Duration,
}

impl TickStats {
    /// Record a finished tick.
    pub fn record(&mut self, elapsed: Duration, period: Duration) {
        self.ticks += 1;
        self.total += elapsed;
        self.max = self.max.max(elapsed);
        if elapsed > period {
            self.overruns += 1;
        }
    }

    /// Average tick duration, zero before the first tick.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.ticks) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total / n,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.ticks as f64),
        }
    }
}
