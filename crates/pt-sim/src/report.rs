//! Per-tick and per-run reports.

use std::time::Duration;

use pt_controls::EvaluationReport;
use pt_core::{TickStats, Volume};
use pt_graph::{ProcessEvent, PublishReport, UpdateReport};

/// Everything that happened in one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// 0-based index of this tick.
    pub tick: u64,
    /// Register writes that reached a controller.
    pub overrides: usize,
    /// Commands applied to the graph.
    pub commands: usize,
    /// Inbound messages refused (unknown controller, bad value, wrong kind).
    pub rejected: usize,
    /// Overflow caused by commands lowering a tank's capacity.
    pub command_events: Vec<ProcessEvent>,
    pub evaluation: EvaluationReport,
    pub update: UpdateReport,
    pub publish: PublishReport,
}

impl TickReport {
    /// Volume lost this tick, from transfers and commands alike.
    pub fn lost(&self) -> Volume {
        self.update.lost() + self.command_events.iter().map(ProcessEvent::lost).sum::<Volume>()
    }
}

/// Totals over one call to `run`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub stats: TickStats,
    pub lost: Volume,
    pub events: usize,
    pub rejected: usize,
    pub alerts: usize,
    pub publish_failures: usize,
    /// Set when the run ended through the stop handle.
    pub stopped: bool,
}

impl RunSummary {
    pub(crate) fn absorb(&mut self, report: &TickReport, elapsed: Duration, period: Duration) {
        self.ticks += 1;
        self.stats.record(elapsed, period);
        self.lost += report.lost();
        self.events += report.update.events.len() + report.command_events.len();
        self.rejected += report.rejected;
        self.alerts += report.evaluation.alerts.len();
        self.publish_failures += report.publish.failed.len();
    }
}
