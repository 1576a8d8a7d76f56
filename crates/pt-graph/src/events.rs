//! Observable outcomes of an update or publish pass.

use pt_core::{CompId, LineId, Volume};

/// Volume moved by one pump in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transfer {
    pub pump: CompId,
    pub source: CompId,
    pub line: LineId,
    pub amount: Volume,
}

/// Anomaly raised during an update. None of these stop the tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// A tank was filled past its capacity; `amount` was lost.
    Overflow { tank: CompId, amount: Volume },

    /// A splitter without outputs received volume and dropped it.
    SplitterDrop { splitter: CompId, amount: Volume },

    /// Volume was routed at something that cannot receive it.
    ///
    /// `target` is `None` when a pump has no outlet line at all.
    UnsupportedTarget {
        from: CompId,
        target: Option<CompId>,
        amount: Volume,
    },

    /// A line still held volume after the flush round limit.
    FlushStalled { line: LineId, amount: Volume },
}

impl ProcessEvent {
    /// Volume that left the process because of this event.
    pub fn lost(&self) -> Volume {
        match self {
            ProcessEvent::Overflow { amount, .. }
            | ProcessEvent::SplitterDrop { amount, .. }
            | ProcessEvent::UnsupportedTarget { amount, .. } => *amount,
            ProcessEvent::FlushStalled { .. } => 0.0,
        }
    }
}

/// Everything one [`update`](crate::ProcessGraph::update) did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    pub transfers: Vec<Transfer>,
    pub events: Vec<ProcessEvent>,
}

impl UpdateReport {
    pub fn transferred(&self) -> Volume {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    pub fn overflow(&self) -> Volume {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProcessEvent::Overflow { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn lost(&self) -> Volume {
        self.events.iter().map(ProcessEvent::lost).sum()
    }
}

/// Outcome of a publish pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub published: usize,
    /// Entities whose publish failed, by external id.
    pub failed: Vec<String>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
