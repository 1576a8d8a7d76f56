//! Error types for the pt-app service layer.

use std::path::PathBuf;

use pt_layout::Diagnostic;

/// Application error wrapping the errors of the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Failed to read {path}: {message}")]
    LayoutFileRead { path: PathBuf, message: String },

    #[error("Layout validation failed with {} problem(s)", diagnostics.len())]
    Invalid { diagnostics: Vec<Diagnostic> },

    #[error("Compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pt-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<pt_layout::LayoutError> for AppError {
    fn from(err: pt_layout::LayoutError) -> Self {
        match err {
            pt_layout::LayoutError::Invalid(diagnostics) => AppError::Invalid { diagnostics },
            other => AppError::Layout(other.to_string()),
        }
    }
}

impl From<pt_graph::GraphError> for AppError {
    fn from(err: pt_graph::GraphError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<pt_controls::ControlError> for AppError {
    fn from(err: pt_controls::ControlError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<pt_components::ComponentError> for AppError {
    fn from(err: pt_components::ComponentError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<pt_sim::SimError> for AppError {
    fn from(err: pt_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}
