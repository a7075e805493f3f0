//! Assembly of a [`SolveResult`] from the final solver state.

use std::collections::BTreeMap;

use wf_core::Diagnostic;
use wf_equipment::EquipmentMetrics;
use wf_graph::{PortDirection, StreamKind};
use wf_validation::SolvedState;

use crate::summary::{DiagnosticSummary, sort_diagnostics};
use crate::types::{BalanceReport, EquipmentResult, SolveResult, StreamResult};

/// Outcome of the iteration, as reported by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveStatus {
    pub converged: bool,
    pub iterations: usize,
}

impl SolveResult {
    /// Build the response from a finished (or interrupted) solve.
    pub fn assemble(
        state: &SolvedState<'_>,
        status: SolveStatus,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let graph = state.graph;

        let mut streams = BTreeMap::new();
        for s in graph.streams() {
            let (Some(props), Some(src), Some(tgt)) = (
                state.streams.get(s.id.idx()),
                graph.port(s.source),
                graph.port(s.target),
            ) else {
                continue;
            };
            let name_of = |id| {
                graph
                    .equipment_node(id)
                    .map(|n| n.name.clone())
                    .unwrap_or_default()
            };
            streams.insert(
                s.name.clone(),
                StreamResult {
                    source_equipment: name_of(s.source_equipment),
                    source_port: src.name().to_string(),
                    target_equipment: name_of(s.target_equipment),
                    target_port: tgt.name().to_string(),
                    properties: *props,
                },
            );
        }

        let mut equipment_results = BTreeMap::new();
        let mut max_residual: f64 = 0.0;
        for node in graph.equipment() {
            let eval = state.evaluations.get(node.id.idx()).and_then(Option::as_ref);
            let balance = state.balance(node.id);
            if let Some(b) = balance {
                max_residual = max_residual.max(b.relative_error());
            }
            equipment_results.insert(
                node.name.clone(),
                EquipmentResult {
                    equipment_type: node.kind.clone(),
                    metrics: eval.map(|e| e.metrics.clone()),
                    mass_balance: balance.map(BalanceReport::from),
                },
            );
        }

        sort_diagnostics(&mut diagnostics);
        let summary = DiagnosticSummary::from_diagnostics(&diagnostics);
        Self {
            converged: status.converged,
            iterations: status.iterations,
            max_residual,
            streams,
            equipment_results,
            system_recovery: system_recovery(state),
            diagnostics,
            summary,
        }
    }

    /// Response for a request rejected before anything was evaluated.
    pub fn rejected(mut diagnostics: Vec<Diagnostic>) -> Self {
        sort_diagnostics(&mut diagnostics);
        let summary = DiagnosticSummary::from_diagnostics(&diagnostics);
        Self {
            converged: false,
            iterations: 0,
            max_residual: 0.0,
            streams: BTreeMap::new(),
            equipment_results: BTreeMap::new(),
            system_recovery: 0.0,
            diagnostics,
            summary,
        }
    }

    pub fn fingerprint(&self) -> crate::ResultsResult<String> {
        crate::hash::fingerprint(self)
    }
}

/// Product flow over external feed flow, percent.
///
/// Product is what reaches `product` sinks plus permeate leaving through
/// unconnected outlets; feed is what feed sources and boundary inlets bring.
pub fn system_recovery(state: &SolvedState<'_>) -> f64 {
    let graph = state.graph;
    let mut feed = 0.0;
    let mut product = 0.0;

    for node in graph.equipment() {
        let Some(e) = state.evaluations.get(node.id.idx()).and_then(Option::as_ref) else {
            continue;
        };
        match &e.metrics {
            EquipmentMetrics::FeedSource(m) => feed += m.flow_rate,
            EquipmentMetrics::Product(m) => product += m.flow_rate,
            _ => {}
        }
    }

    for port in graph.boundary_ports() {
        let flow = state
            .inlets
            .get(port.equipment.idx())
            .and_then(|i| i.get(port.name()))
            .map_or(0.0, |s| s.flow_rate);
        feed += flow;
    }

    for port in graph.ports() {
        let open_permeate = port.direction() == PortDirection::Outlet
            && port.stream.is_none()
            && port.spec.compatible == [StreamKind::Permeate];
        if !open_permeate {
            continue;
        }
        let flow = state
            .evaluations
            .get(port.equipment.idx())
            .and_then(Option::as_ref)
            .and_then(|e| e.outlets.get(port.name()))
            .map_or(0.0, |s| s.flow_rate);
        product += flow;
    }

    if feed > 0.0 { product / feed * 100.0 } else { 0.0 }
}
