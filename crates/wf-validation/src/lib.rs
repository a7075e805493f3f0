//! wf-validation: engineering checks around a flowsheet solve.
//!
//! - [`config`]: domain checks on equipment configuration and external
//!   feeds, run before anything is evaluated
//! - [`derived`]: checks on the converged (or best-effort) state
//! - [`limits`]: the thresholds both use, overridable per request

pub mod config;
pub mod derived;
pub mod limits;

pub use config::{check_equipment, check_stream};
pub use derived::{SolvedState, check_solution};
pub use limits::{Bounds, ValidationLimits};
