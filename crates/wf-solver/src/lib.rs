//! Steady-state mass-balance solver for water-treatment flowsheets.
//!
//! A request is compiled into a [`Flowsheet`] (typed configs, port graph,
//! external feeds), checked, then solved block by block along the graph's
//! evaluation plan. Recycle loops are iterated to a fixed point. Problems
//! found before solving reject the request; problems found while solving
//! are reported as diagnostics next to the (possibly partial) result.
//!
//! ```
//! let request = wf_project::from_json_str(r#"{
//!     "equipment": {
//!         "FEED": { "type": "feed_source" },
//!         "OUT":  { "type": "product" }
//!     },
//!     "connections": {
//!         "S1": { "sourceEquipment": "FEED", "sourcePort": "outlet",
//!                 "targetEquipment": "OUT", "targetPort": "inlet" }
//!     }
//! }"#).unwrap();
//! let result = wf_solver::solve(&request);
//! assert!(result.converged);
//! assert_eq!(result.system_recovery, 100.0);
//! ```

pub mod batch;
pub mod compile;
pub mod error;
pub mod options;
pub mod solve;

pub use batch::{solve_batch, solve_batch_with};
pub use compile::{Compiled, Flowsheet, compile};
pub use error::{SolverError, SolverResult};
pub use options::{CancelToken, SolveOptions};
pub use solve::{solve, solve_flowsheet, solve_with};

use std::path::Path;

/// Load a request file and solve it with its own options.
pub fn solve_path(path: &Path) -> SolverResult<wf_results::SolveResult> {
    let request = wf_project::load(path)?;
    Ok(solve(&request))
}
