//! Sequential-modular mass-balance solve.
//!
//! Blocks run in plan order. A single equipment is evaluated once; a
//! recycle loop is iterated Gauss-Seidel style in plan order. Streams that
//! run against that order are the loop's tear streams: their flow rates are
//! under-relaxed, everything else takes the computed value. A loop is done
//! when flows settle and every member balances over the published streams.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, trace, warn};
use wf_core::{Diagnostic, EquipId, Severity, StreamId, codes, relative_change, relax};
use wf_equipment::{Evaluation, PortStreams};
use wf_graph::{EvalBlock, PortDirection};
use wf_project::SolveRequest;
use wf_results::{SolveResult, SolveStatus};
use wf_validation::{SolvedState, check_solution};
use wf_water::StreamState;

use crate::compile::{Compiled, Flowsheet, compile};
use crate::error::SolverError;
use crate::options::SolveOptions;

/// Why iteration stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Timeout,
    Cancelled,
}

/// Mutable state of one solve.
struct Solver<'a> {
    flowsheet: &'a Flowsheet,
    options: &'a SolveOptions,
    started: Instant,
    streams: Vec<StreamState>,
    evaluations: Vec<Option<Evaluation>>,
    inlets: Vec<PortStreams>,
    /// By stream id; true for streams closing a recycle loop.
    tears: Vec<bool>,
    /// First failure per equipment.
    failures: BTreeMap<EquipId, SolverError>,
}

impl<'a> Solver<'a> {
    fn new(flowsheet: &'a Flowsheet, options: &'a SolveOptions) -> Self {
        let n_eq = flowsheet.graph.equipment().len();
        Self {
            flowsheet,
            options,
            started: Instant::now(),
            streams: vec![StreamState::seed(); flowsheet.graph.streams().len()],
            evaluations: vec![None; n_eq],
            inlets: vec![PortStreams::new(); n_eq],
            tears: vec![false; flowsheet.graph.streams().len()],
            failures: BTreeMap::new(),
        }
    }

    fn interrupted(&self) -> Option<Interrupt> {
        if self.options.is_cancelled() {
            return Some(Interrupt::Cancelled);
        }
        match self.options.timeout {
            Some(limit) if self.started.elapsed() >= limit => Some(Interrupt::Timeout),
            _ => None,
        }
    }

    /// Current inlet states of one equipment: connected streams plus
    /// external feeds.
    fn gather_inlets(&self, id: EquipId) -> PortStreams {
        let graph = &self.flowsheet.graph;
        let mut inlets = self
            .flowsheet
            .boundaries
            .get(id.idx())
            .cloned()
            .unwrap_or_default();
        for port in graph.ports_of(id, PortDirection::Inlet) {
            if let Some(sid) = port.stream {
                inlets.insert(port.name(), self.streams[sid.idx()]);
            }
        }
        inlets
    }

    fn state(&self) -> SolvedState<'_> {
        SolvedState {
            graph: &self.flowsheet.graph,
            streams: &self.streams,
            evaluations: &self.evaluations,
            inlets: &self.inlets,
        }
    }

    /// Mark the streams of a loop whose target runs no later than their
    /// source in `members` order.
    fn mark_tears(&mut self, members: &[EquipId]) -> Vec<StreamId> {
        let flowsheet = self.flowsheet;
        let position = |id: EquipId| members.iter().position(|m| *m == id);
        let mut tears = Vec::new();
        for s in flowsheet.graph.streams() {
            if let (Some(from), Some(to)) = (position(s.source_equipment), position(s.target_equipment)) {
                if to <= from {
                    self.tears[s.id.idx()] = true;
                    tears.push(s.id);
                }
            }
        }
        tears
    }

    /// Evaluate one equipment and publish its outlets.
    ///
    /// Tear-stream flow rates are blended with their previous values by the
    /// relaxation factor. Returns the largest relative change between the
    /// computed and previous flow of any published stream.
    fn evaluate(&mut self, id: EquipId) -> f64 {
        let flowsheet = self.flowsheet;
        let Some(config) = flowsheet.config(id) else {
            return 0.0;
        };
        let inlets = self.gather_inlets(id);
        let eval = match config.evaluate(&inlets) {
            Ok(e) => e,
            Err(e) => {
                let equipment = self.name(id);
                warn!(equipment = %equipment, error = %e, "equipment evaluation failed");
                self.failures
                    .entry(id)
                    .or_insert(SolverError::Equipment { equipment, source: e });
                self.evaluations[id.idx()] = None;
                self.inlets[id.idx()] = inlets;
                return 0.0;
            }
        };

        let mut residual: f64 = 0.0;
        for port in flowsheet.graph.ports_of(id, PortDirection::Outlet) {
            let Some(sid) = port.stream else { continue };
            let old = self.streams[sid.idx()];
            let new = eval
                .outlets
                .get(port.name())
                .copied()
                .unwrap_or_else(|| old.with_flow(0.0));
            residual = residual.max(relative_change(new.flow_rate, old.flow_rate));
            let omega = if self.tears[sid.idx()] {
                self.options.relaxation
            } else {
                1.0
            };
            self.streams[sid.idx()] = new.with_flow(relax(new.flow_rate, old.flow_rate, omega));
        }
        self.evaluations[id.idx()] = Some(eval);
        self.inlets[id.idx()] = inlets;
        residual
    }

    /// Every member balances over the streams as published now.
    fn balances_close(&self, members: &[EquipId]) -> bool {
        let state = self.state();
        members.iter().all(|&id| {
            state
                .balance(id)
                .is_some_and(|b| b.closes(self.options.balance_tolerance))
        })
    }

    fn name(&self, id: EquipId) -> String {
        self.flowsheet
            .graph
            .equipment_node(id)
            .map(|n| n.name.clone())
            .unwrap_or_default()
    }

    /// Iterate a recycle loop. Returns the pass count and whether it settled.
    fn iterate(&mut self, members: &[EquipId]) -> Result<(usize, bool), (usize, Interrupt)> {
        let names: Vec<String> = members.iter().map(|&id| self.name(id)).collect();
        let tears: Vec<String> = self
            .mark_tears(members)
            .into_iter()
            .filter_map(|sid| self.flowsheet.graph.stream(sid))
            .map(|s| s.name.clone())
            .collect();
        debug!(members = ?names, tears = ?tears, "iterating recycle block");

        for pass in 1..=self.options.max_iterations {
            if pass > 1 {
                if let Some(why) = self.interrupted() {
                    return Err((pass - 1, why));
                }
            }
            let residual = members
                .iter()
                .map(|&id| self.evaluate(id))
                .fold(0.0, f64::max);
            trace!(pass, residual, "recycle pass");

            if residual < self.options.tolerance && self.balances_close(members) {
                debug!(passes = pass, residual, "recycle block converged");
                return Ok((pass, true));
            }
        }
        warn!(
            members = ?names,
            budget = self.options.max_iterations,
            "recycle block did not converge"
        );
        Ok((self.options.max_iterations, false))
    }

    fn run(&mut self) -> (SolveStatus, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let mut converged = true;
        let mut iterations = 1;

        let plan = self.flowsheet.graph.evaluation_plan();
        for block in plan.iter() {
            if let Some(why) = self.interrupted() {
                diagnostics.push(interrupt_diagnostic(why));
                converged = false;
                break;
            }
            match block {
                EvalBlock::Single(id) => {
                    self.evaluate(*id);
                }
                EvalBlock::Iterative(members) => match self.iterate(members) {
                    Ok((passes, settled)) => {
                        iterations = iterations.max(passes);
                        if !settled {
                            converged = false;
                            diagnostics.push(Diagnostic::convergence(
                                Severity::Error,
                                codes::CONVERGENCE_FAILED,
                                format!(
                                    "Recycle loop through {} did not converge in {} iterations",
                                    self.loop_label(members),
                                    passes
                                ),
                            ));
                        }
                    }
                    Err((passes, why)) => {
                        iterations = iterations.max(passes);
                        converged = false;
                        diagnostics.push(interrupt_diagnostic(why));
                        break;
                    }
                },
            }
        }

        if !self.failures.is_empty() {
            converged = false;
        }
        for (id, err) in &self.failures {
            diagnostics.push(
                Diagnostic::convergence(
                    Severity::Error,
                    codes::EQUIPMENT_CALC_ERROR,
                    err.to_string(),
                )
                .on(self.name(*id)),
            );
        }
        (SolveStatus { converged, iterations }, diagnostics)
    }

    fn loop_label(&self, members: &[EquipId]) -> String {
        members
            .iter()
            .map(|&id| self.name(id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn interrupt_diagnostic(why: Interrupt) -> Diagnostic {
    match why {
        Interrupt::Timeout => Diagnostic::convergence(
            Severity::Error,
            codes::SOLVE_TIMEOUT,
            "Solve stopped at the time limit; results are partial",
        ),
        Interrupt::Cancelled => Diagnostic::convergence(
            Severity::Warning,
            codes::SOLVE_CANCELLED,
            "Solve was cancelled; results are partial",
        ),
    }
}

/// Solve with the request's own `options` over the defaults.
pub fn solve(request: &SolveRequest) -> SolveResult {
    solve_with(request, &SolveOptions::from_request(&request.options))
}

/// Solve with fully resolved options; the request's `options` block is
/// ignored. Out-of-range options reject the request with `INVALID_OPTION`.
#[tracing::instrument(skip_all, fields(equipment = request.equipment.len()))]
pub fn solve_with(request: &SolveRequest, options: &SolveOptions) -> SolveResult {
    let (flowsheet, diagnostics) = match compile(request, options) {
        Compiled::Ready(fs, advisories) => (fs, advisories),
        Compiled::Rejected(diagnostics) => {
            warn!(count = diagnostics.len(), "request rejected before solving");
            return SolveResult::rejected(diagnostics);
        }
    };
    solve_flowsheet(&flowsheet, options, diagnostics)
}

/// Solve a compiled flowsheet; `diagnostics` holds what compiling found.
pub fn solve_flowsheet(
    flowsheet: &Flowsheet,
    options: &SolveOptions,
    mut diagnostics: Vec<Diagnostic>,
) -> SolveResult {
    let issues = options.check();
    if !issues.is_empty() {
        warn!(count = issues.len(), "solve options rejected");
        diagnostics.extend(issues.iter().map(|i| i.to_diagnostic()));
        return SolveResult::rejected(diagnostics);
    }
    let mut solver = Solver::new(flowsheet, options);
    let (status, run_diagnostics) = solver.run();
    diagnostics.extend(run_diagnostics);

    let state = solver.state();
    diagnostics.extend(check_solution(&state, &options.limits, options.balance_tolerance));

    debug!(
        converged = status.converged,
        iterations = status.iterations,
        elapsed_ms = solver.started.elapsed().as_millis() as u64,
        "solve finished"
    );
    SolveResult::assemble(&state, status, diagnostics)
}
