//! pt-core: shared foundation for the process twin.
//!
//! Contains:
//! - ids (compact arena indices for components and lines)
//! - numeric (volume scalar + float helpers)
//! - timing (tick duration statistics)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PtError, PtResult};
pub use ids::*;
pub use numeric::*;
pub use timing::{TickStats, TickTimer};
