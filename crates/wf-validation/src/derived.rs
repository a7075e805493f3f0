//! Post-solve checks on derived values.
//!
//! These annotate a finished solve; they never change it.

use wf_core::{Diagnostic, EquipId, Severity, codes};
use wf_equipment::{Evaluation, MassBalance, PortStreams, common::pipe_velocity};
use wf_graph::{FlowsheetGraph, PortDirection};
use wf_water::StreamState;

use crate::limits::ValidationLimits;

/// Final state of a solve, indexed the way the graph indexes it.
#[derive(Debug, Clone, Copy)]
pub struct SolvedState<'a> {
    pub graph: &'a FlowsheetGraph,
    /// By stream id.
    pub streams: &'a [StreamState],
    /// By equipment id; `None` where the model could not be evaluated.
    pub evaluations: &'a [Option<Evaluation>],
    /// Inlet states each evaluation was computed from, by equipment id.
    pub inlets: &'a [PortStreams],
}

impl SolvedState<'_> {
    /// Mass balance of one equipment over the published state, kg/h.
    ///
    /// Connected ports are read from the stream table, so a stream that
    /// changed after the equipment last ran shows up as a residual.
    /// External feeds and unconnected outlets come from the equipment's own
    /// inlets and evaluation; so do accumulation and external exchange.
    /// `None` when the equipment has no evaluation.
    pub fn balance(&self, id: EquipId) -> Option<MassBalance> {
        let eval = self.evaluations.get(id.idx())?.as_ref()?;
        let inlets = self.inlets.get(id.idx());

        let inflow: f64 = self
            .graph
            .ports_of(id, PortDirection::Inlet)
            .into_iter()
            .filter_map(|port| match port.stream {
                Some(sid) => self.streams.get(sid.idx()),
                None => inlets.and_then(|i| i.get(port.name())),
            })
            .map(StreamState::mass_flow)
            .sum();
        let outflow: f64 = self
            .graph
            .ports_of(id, PortDirection::Outlet)
            .into_iter()
            .filter_map(|port| match port.stream {
                Some(sid) => self.streams.get(sid.idx()),
                None => eval.outlets.get(port.name()),
            })
            .map(StreamState::mass_flow)
            .sum();

        Some(MassBalance::new(inflow, outflow, eval.accumulation, eval.external))
    }
}

/// Run every derived-value check.
pub fn check_solution(
    state: &SolvedState<'_>,
    limits: &ValidationLimits,
    balance_tolerance: f64,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    check_equipment(state, limits, balance_tolerance, &mut out);
    check_streams(state, limits, &mut out);
    out
}

fn check_equipment(
    state: &SolvedState<'_>,
    limits: &ValidationLimits,
    balance_tolerance: f64,
    out: &mut Vec<Diagnostic>,
) {
    for node in state.graph.equipment() {
        let Some(eval) = state.evaluations.get(node.id.idx()).and_then(Option::as_ref) else {
            continue;
        };
        out.extend(eval.violations.iter().map(|v| v.to_diagnostic(&node.name)));

        if let Some(recovery) = eval.metrics.recovery() {
            let at_ceiling = eval.violations.iter().any(|v| v.code == codes::RECOVERY_CEILING);
            if recovery > limits.high_recovery_pct && !at_ceiling {
                out.push(
                    Diagnostic::physical(
                        Severity::Warning,
                        codes::HIGH_RECOVERY,
                        format!("Recovery {:.1}% may cause excessive fouling", recovery),
                    )
                    .on(&node.name),
                );
            }
        }

        if let Some(balance) = state.balance(node.id) {
            if !balance.closes(balance_tolerance) {
                let severity = if balance.relative_error() * 100.0 > limits.mass_balance_error_pct {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                out.push(
                    Diagnostic::physical(
                        severity,
                        codes::MASS_BALANCE,
                        format!(
                            "Mass balance off by {:.3}% (in {:.1} kg/h, out {:.1} kg/h)",
                            balance.relative_error() * 100.0,
                            balance.inflow,
                            balance.outflow
                        ),
                    )
                    .on(&node.name),
                );
            }
        }
    }
}

fn check_streams(state: &SolvedState<'_>, limits: &ValidationLimits, out: &mut Vec<Diagnostic>) {
    let graph = state.graph;
    for stream in graph.streams() {
        let Some(s) = state.streams.get(stream.id.idx()) else {
            continue;
        };
        let (Some(src), Some(tgt)) = (graph.port(stream.source), graph.port(stream.target)) else {
            continue;
        };
        let target = graph
            .equipment_node(stream.target_equipment)
            .map(|n| n.name.as_str())
            .unwrap_or_default();

        let rating = src.spec.max_pressure_bar.min(tgt.spec.max_pressure_bar);
        if s.pressure > rating {
            out.push(
                Diagnostic::physical(
                    Severity::Error,
                    codes::PORT_OVERPRESSURE,
                    format!(
                        "Stream '{}' at {:.2} bar exceeds the {:.1} bar port rating",
                        stream.name, s.pressure, rating
                    ),
                )
                .on(target),
            );
        }

        let bore = src.spec.diameter_m.min(tgt.spec.diameter_m);
        let velocity = pipe_velocity(s.flow_rate, bore);
        if velocity > limits.max_velocity_mps {
            out.push(
                Diagnostic::physical(
                    Severity::Warning,
                    codes::HIGH_VELOCITY,
                    format!(
                        "Stream '{}' runs at {:.2} m/s through a {:.0} mm port",
                        stream.name,
                        velocity,
                        bore * 1000.0
                    ),
                )
                .on(target),
            );
        }
    }

    // External feeds are checked against the port they enter.
    for port in graph.boundary_ports() {
        let Some(node) = graph.equipment_node(port.equipment) else {
            continue;
        };
        let Some(s) = state.inlets.get(node.id.idx()).and_then(|i| i.get(port.name())) else {
            continue;
        };
        if s.pressure > port.spec.max_pressure_bar {
            out.push(
                Diagnostic::physical(
                    Severity::Error,
                    codes::PORT_OVERPRESSURE,
                    format!(
                        "External feed on '{}' at {:.2} bar exceeds the {:.1} bar port rating",
                        port.name(),
                        s.pressure,
                        port.spec.max_pressure_bar
                    ),
                )
                .on(&node.name),
            );
        }
    }
}
