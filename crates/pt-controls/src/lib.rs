//! Supervisory control for the process twin.
//!
//! This crate provides the controller side of the twin: rule-evaluating PLC and
//! supervisor (SCADA) analogues that sit between the process graph and an
//! externally addressable register file.
//!
//! # Architecture
//!
//! - [`Action`]s are stateless `trigger -> effect` rules, re-evaluated from
//!   scratch every tick by the [`ActionEngine`]
//! - a [`RegisterMap`] binds device ids to register addresses, both ways
//! - a [`RegisterBank`] is the controller's externally visible register file
//! - a [`Controller`] ties them together: it evaluates its rules, pushes
//!   canonical device values to its registers and applies external overrides
//!
//! Failures are isolated per action and per effect target; nothing here aborts
//! a tick.

pub mod alert;
pub mod controller;
pub mod engine;
pub mod error;
pub mod registers;
pub mod rule;

pub use alert::Alert;
pub use controller::{Controller, ControllerKind, Endpoint, OverrideOutcome, PushReport};
pub use engine::{ActionEngine, EvaluationReport};
pub use error::{ControlError, ControlResult};
pub use registers::{DEFAULT_REGISTER_COUNT, RegisterBank, RegisterMap};
pub use rule::{Action, Condition, Effect, EffectAction, EffectTarget, Trigger};
