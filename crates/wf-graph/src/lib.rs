//! wf-graph: the flowsheet stream graph.
//!
//! Provides:
//! - Port specifications (direction, compatible stream kinds, rating)
//! - Incremental builder that checks every connection as it is added
//! - Immutable `FlowsheetGraph` with predecessor/successor queries
//! - Evaluation planning: topological order of single equipment and
//!   iterative blocks (strongly-connected components)
//!
//! # Example
//!
//! ```
//! use wf_graph::{GraphBuilder, PortSpec, StreamKind};
//!
//! const RAW: &[StreamKind] = &[StreamKind::Raw];
//! const SOURCE: &[PortSpec] = &[PortSpec::outlet("outlet", RAW)];
//! const SINK: &[PortSpec] = &[PortSpec::inlet("inlet", RAW)];
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_equipment("FEED", "feed_source", SOURCE).unwrap();
//! builder.add_equipment("OUT", "product", SINK).unwrap();
//! builder.connect("S1", "FEED", "outlet", "OUT", "inlet").unwrap();
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.equipment().len(), 2);
//! assert!(!graph.has_cycles());
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod topology;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{EquipmentNode, FlowsheetGraph, Port, PortDirection, PortSpec, Stream, StreamKind};
pub use topology::{EvalBlock, EvaluationPlan};
