//! wf-results: the solve response and how it is assembled.

pub mod aggregate;
pub mod hash;
pub mod summary;
pub mod types;

pub use aggregate::SolveStatus;
pub use hash::fingerprint;
pub use summary::{DiagnosticSummary, sort_diagnostics};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
