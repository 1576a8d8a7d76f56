//! pt-graph: the process graph.
//!
//! Provides:
//! - [`ProcessGraph`], an arena owning every component and line
//! - [`GraphBuilder`], incremental construction with wiring checks
//! - the per-tick two-phase update (pump transfer, then line flush)
//! - per-entity isolated publishing and remote command application
//!
//! # Example
//!
//! ```
//! use pt_graph::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_tank("src", "Source", 1000.0, 800.0).unwrap();
//! builder.add_pump("p1", "Feed pump", 200.0, true).unwrap();
//! builder.add_tank("dst", "Sink", 500.0, 0.0).unwrap();
//! builder.connect("l1", "src", "p1").unwrap();
//! builder.connect("l2", "p1", "dst").unwrap();
//! let mut graph = builder.build().unwrap();
//!
//! let report = graph.update();
//! assert!(report.events.is_empty());
//! assert_eq!(graph.device("dst").unwrap().value(), 200.0);
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod graph;
pub mod indexing;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use events::{ProcessEvent, PublishReport, Transfer, UpdateReport};
pub use graph::{ProcessGraph, TransferPolicy};
pub use indexing::NameIndex;
