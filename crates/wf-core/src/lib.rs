//! wf-core: stable foundation for waterflow.
//!
//! Contains:
//! - units (uom SI types + constructors in plant units: bar, m³/h, °C)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for graph objects)
//! - diagnostics (the uniform diagnostic record shared by every layer)
//! - error (shared error types)

pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use diagnostics::{Diagnostic, DiagnosticClass, Severity, codes};
pub use error::{WfError, WfResult};
pub use ids::*;
pub use numeric::*;
