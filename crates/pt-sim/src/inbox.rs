//! Inbound mailbox.
//!
//! External register writes and commands are queued here by whatever thread
//! receives them and applied by the tick loop at the start of the next tick.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use pt_bus::Command;
use pt_core::{Real, RegisterAddr};

use crate::error::{SimError, SimResult};

/// A message for the tick loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Register write addressed to one controller's register file.
    RegisterWrite {
        controller: String,
        address: RegisterAddr,
        value: Real,
    },
    Command(Command),
}

/// Producer side of the inbox. Cheap to clone, never blocks.
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: Sender<Inbound>,
}

pub(crate) fn channel(capacity: usize) -> (InboundSender, Receiver<Inbound>) {
    let (tx, rx) = bounded(capacity);
    (InboundSender { tx }, rx)
}

impl InboundSender {
    /// Queue a message.
    ///
    /// # Errors
    /// [`SimError::InboxFull`] when the bounded inbox is full; the message is
    /// dropped and the caller decides whether to retry.
    pub fn send(&self, message: Inbound) -> SimResult<()> {
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => SimError::InboxFull,
            TrySendError::Disconnected(_) => SimError::Disconnected,
        })
    }

    pub fn write_register(&self, controller: &str, address: RegisterAddr, value: Real) -> SimResult<()> {
        self.send(Inbound::RegisterWrite {
            controller: controller.to_string(),
            address,
            value,
        })
    }

    /// Parse a `set/...` message and queue it.
    ///
    /// Malformed messages are rejected here, before reaching the tick loop.
    pub fn publish_command(&self, topic: &str, payload: &str) -> SimResult<()> {
        let command = Command::parse(topic, payload)?;
        self.send(Inbound::Command(command))
    }

    /// Messages waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}
