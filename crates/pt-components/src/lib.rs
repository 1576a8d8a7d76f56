//! pt-components: component library for the process twin.
//!
//! Provides models for the flow elements of a process:
//! - Tanks with a hard capacity bound and overflow accounting
//! - Pumps with a remote-settable rate and open/closed state
//! - Splitters dividing received volume equally across their outputs
//! - Lines buffering one tick's transfer between two components
//!
//! Components never hold references to each other. Topology is expressed with
//! [`CompId`](pt_core::CompId) / [`LineId`](pt_core::LineId) indices owned by the
//! process graph, and polymorphism goes through the [`Device`] sum type.

pub mod component;
pub mod device;
pub mod error;
pub mod line;
pub mod pump;
pub mod splitter;
pub mod tank;

// Re-exports
pub use component::{Component, Position};
pub use device::{Device, DeviceKind, RegisterOverride};
pub use error::{ComponentError, ComponentResult};
pub use line::Line;
pub use pump::Pump;
pub use splitter::{Division, Splitter};
pub use tank::{Tank, VolumeOverride};
