//! Error types for control operations.

use pt_core::RegisterAddr;
use pt_graph::GraphError;
use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Address outside the controller's register file.
    #[error("Register {address} out of range (register file has {size})")]
    RegisterOutOfRange { address: RegisterAddr, size: usize },

    /// Register file size of zero or beyond the address space.
    #[error("Register file size {size} out of range (1..={max})")]
    RegisterFileSize { size: usize, max: usize },

    /// Two devices mapped to the same register.
    #[error("Register {address} already mapped to '{device}'")]
    DuplicateRegister {
        address: RegisterAddr,
        device: String,
    },

    /// One device mapped to two registers.
    #[error("Device '{device}' already mapped to register {address}")]
    DuplicateDevice {
        device: String,
        address: RegisterAddr,
    },

    /// External write carrying an unusable value; the register keeps its value.
    #[error("Malformed value {value} written to register {address}")]
    MalformedValue { address: RegisterAddr, value: f64 },

    /// The process graph rejected the operation.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}
