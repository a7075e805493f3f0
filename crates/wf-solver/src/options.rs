//! Solver settings.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use wf_project::{OptionsDef, RequestIssue, check_options};
use wf_validation::ValidationLimits;

/// Cooperative cancellation flag, shared between the caller and a solve.
///
/// The solver polls it between passes; a cancelled solve returns what it
/// has so far.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Largest relative flow change between passes that counts as converged.
    pub tolerance: f64,
    /// Pass budget per iterative block.
    pub max_iterations: usize,
    /// Under-relaxation factor for flow rates inside recycle loops, (0, 1].
    pub relaxation: f64,
    /// Largest relative mass-balance error per equipment.
    pub balance_tolerance: f64,
    /// Wall-clock budget for the whole solve.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelToken>,
    pub limits: ValidationLimits,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 100,
            relaxation: 0.5,
            balance_tolerance: 1e-3,
            timeout: None,
            cancel: None,
            limits: ValidationLimits::default(),
        }
    }
}

impl SolveOptions {
    /// Defaults overlaid with a request's `options` block.
    pub fn from_request(overrides: &OptionsDef) -> Self {
        let mut opts = Self::default();
        opts.apply(overrides);
        opts
    }

    /// Overlay every value the request sets.
    pub fn apply(&mut self, o: &OptionsDef) {
        if let Some(v) = o.tolerance {
            self.tolerance = v;
        }
        if let Some(v) = o.max_iterations {
            self.max_iterations = v;
        }
        if let Some(v) = o.relaxation {
            self.relaxation = v;
        }
        if let Some(v) = o.balance_tolerance {
            self.balance_tolerance = v;
        }
        if let Some(ms) = o.timeout_ms {
            self.timeout = Some(Duration::from_millis(ms));
        }
        if let Some(limits) = &o.limits {
            self.limits = limits.clone();
        }
    }

    /// Same rules as a request's `options` block, applied to the values
    /// that will actually drive the solve.
    pub fn check(&self) -> Vec<RequestIssue> {
        check_options(&OptionsDef {
            tolerance: Some(self.tolerance),
            max_iterations: Some(self.max_iterations),
            relaxation: Some(self.relaxation),
            balance_tolerance: Some(self.balance_tolerance),
            ..OptionsDef::default()
        })
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}
