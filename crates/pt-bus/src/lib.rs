//! Publish/subscribe boundary of the process twin.
//!
//! The broker itself lives outside this workspace. This crate defines what the
//! core needs from it:
//! - [`Publisher`]: the outbound seam, with an in-memory implementation for
//!   tests and tooling
//! - [`topics`]: the topic namespace for state snapshots and commands
//! - [`Command`]: typed inbound commands parsed from `set/...` topics
//! - [`RateLimiter`]: the sliding-window publish limiter

pub mod command;
pub mod error;
pub mod publisher;
pub mod rate_limit;
pub mod topics;

pub use command::{Command, PumpState};
pub use error::{BusError, BusResult};
pub use publisher::{MemoryBus, Message, Publisher, TracingPublisher};
pub use rate_limit::{RateLimitedPublisher, RateLimiter};
