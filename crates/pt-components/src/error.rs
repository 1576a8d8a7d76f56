//! Error types for component operations.

use pt_core::PtError;
use thiserror::Error;

/// Errors that can occur when operating on a component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Negative value for {what}: {value}")]
    Negative { what: &'static str, value: f64 },

    #[error("Initial volume {initial} exceeds max capacity {max_capacity}")]
    InitialExceedsCapacity { initial: f64, max_capacity: f64 },

    #[error("Not supported: {what} on {kind}")]
    NotSupported {
        what: &'static str,
        kind: &'static str,
    },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<PtError> for ComponentError {
    fn from(e: PtError) -> Self {
        match e {
            PtError::NonFinite { what, value } => ComponentError::NonFinite { what, value },
            PtError::Negative { what, value } => ComponentError::Negative { what, value },
            PtError::InvalidArg { what } | PtError::Invariant { what } => {
                ComponentError::NotSupported {
                    what,
                    kind: "component",
                }
            }
        }
    }
}

impl From<ComponentError> for PtError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonFinite { what, value } => PtError::NonFinite { what, value },
            ComponentError::Negative { what, value } => PtError::Negative { what, value },
            ComponentError::InitialExceedsCapacity { .. } => PtError::Invariant {
                what: "initial volume exceeds capacity",
            },
            ComponentError::NotSupported { what, .. } => PtError::InvalidArg { what },
        }
    }
}
