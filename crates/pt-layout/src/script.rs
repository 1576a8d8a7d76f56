//! Traffic injection scripts.
//!
//! A script lists register writes and commands to deliver before given ticks,
//! standing in for external (possibly hostile) peers on the register and
//! pub/sub boundaries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Script {
    pub entries: Vec<InjectEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjectEntry {
    /// Delivered before this tick (0-based) runs.
    pub tick: u64,
    #[serde(flatten)]
    pub kind: InjectKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InjectKind {
    Register {
        controller: String,
        address: u16,
        value: f64,
    },
    Command {
        topic: String,
        payload: String,
    },
}

impl Script {
    /// Entries due before `tick`, in script order.
    pub fn due(&self, tick: u64) -> impl Iterator<Item = &InjectKind> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.tick == tick)
            .map(|e| &e.kind)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
