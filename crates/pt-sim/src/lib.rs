//! Tick scheduler for the process twin.
//!
//! Provides:
//! - [`Simulation`]: owns the graph and controllers and runs the fixed-period
//!   loop (inbox drain, rule evaluation and push, graph update, publish)
//! - [`InboundSender`]: the non-blocking hand-off for register writes and
//!   commands arriving from other threads
//! - [`StopHandle`]: cooperative stop, checked once per tick

pub mod error;
pub mod inbox;
pub mod report;
pub mod sim;

pub use error::{SimError, SimResult};
pub use inbox::{Inbound, InboundSender};
pub use report::{RunSummary, TickReport};
pub use sim::{RunHooks, SimOptions, Simulation, StopHandle};
