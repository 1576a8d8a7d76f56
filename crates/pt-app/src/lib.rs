//! Shared application service layer for processtwin.
//!
//! Turns a layout document into a graph and its controllers, and wires them
//! into a runnable [`Simulation`](pt_sim::Simulation) for the CLI.

pub mod compile;
pub mod error;
pub mod project_service;
pub mod run_service;

pub use compile::{Compiled, LoadPolicy, compile, compile_actions};
pub use error::{AppError, AppResult};
pub use project_service::{
    LayoutSummary, load_layout, load_script, save_layout, summarize, validate,
};
pub use run_service::{
    Prepared, RunRequest, RunResponse, ScriptHooks, prepare, run, run_observed,
};
