//! Error types for the scheduler.

use thiserror::Error;

/// Errors raised when setting up or feeding a simulation.
///
/// Nothing inside a running tick produces these; per-entity failures are
/// logged and counted in the tick report instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Duplicate controller id '{id}'")]
    DuplicateController { id: String },

    #[error("Inbox full, message dropped")]
    InboxFull,

    #[error("Simulation has shut down")]
    Disconnected,

    #[error("Malformed command: {message}")]
    Command { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<pt_bus::BusError> for SimError {
    fn from(e: pt_bus::BusError) -> Self {
        SimError::Command {
            message: e.to_string(),
        }
    }
}
