//! Graph-specific error types.

use pt_components::{ComponentError, DeviceKind};
use pt_core::PtError;

/// Graph construction and mutation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Two components share an id.
    DuplicateComponent { id: String },

    /// Two lines share an id.
    DuplicateLine { id: String },

    /// A reference names a component that doesn't exist.
    UnknownComponent { id: String },

    /// A pump already has an outlet line.
    PumpOutletConflict {
        pump: String,
        existing: String,
        line: String,
    },

    /// A pump draws from something other than a tank.
    InvalidPumpSource {
        pump: String,
        source: String,
        kind: DeviceKind,
    },

    /// Operation addressed a component of the wrong kind.
    WrongKind {
        id: String,
        expected: DeviceKind,
        actual: DeviceKind,
    },

    /// A component rejected the operation.
    Component { id: String, source: ComponentError },
}

pub type GraphResult<T> = Result<T, GraphError>;

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateComponent { id } => {
                write!(f, "Duplicate component id '{}'", id)
            }
            GraphError::DuplicateLine { id } => write!(f, "Duplicate line id '{}'", id),
            GraphError::UnknownComponent { id } => write!(f, "Unknown component '{}'", id),
            GraphError::PumpOutletConflict {
                pump,
                existing,
                line,
            } => {
                write!(
                    f,
                    "Pump '{}' already feeds line '{}', cannot also feed '{}'",
                    pump, existing, line
                )
            }
            GraphError::InvalidPumpSource { pump, source, kind } => {
                write!(
                    f,
                    "Pump '{}' draws from {} '{}', expected a tank",
                    pump, kind, source
                )
            }
            GraphError::WrongKind {
                id,
                expected,
                actual,
            } => {
                write!(f, "Component '{}' is a {}, expected a {}", id, actual, expected)
            }
            GraphError::Component { id, source } => {
                write!(f, "Component '{}': {}", id, source)
            }
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Component { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<GraphError> for PtError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Component { source, .. } => source.into(),
            _ => PtError::InvalidArg {
                what: "invalid process graph",
            },
        }
    }
}
