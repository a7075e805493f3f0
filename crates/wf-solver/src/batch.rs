//! Independent solves in parallel.

use rayon::prelude::*;
use wf_project::SolveRequest;
use wf_results::SolveResult;

use crate::options::SolveOptions;
use crate::solve::{solve, solve_with};

/// Solve each request with its own options. Results keep request order.
pub fn solve_batch(requests: &[SolveRequest]) -> Vec<SolveResult> {
    requests.par_iter().map(solve).collect()
}

/// Solve each request with the options `resolve` picks for it.
pub fn solve_batch_with<F>(requests: &[SolveRequest], resolve: F) -> Vec<SolveResult>
where
    F: Fn(&SolveRequest) -> SolveOptions + Sync,
{
    requests
        .par_iter()
        .map(|r| solve_with(r, &resolve(r)))
        .collect()
}
