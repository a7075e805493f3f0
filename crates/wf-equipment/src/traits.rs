//! The evaluation interface shared by every equipment model.

use std::collections::BTreeMap;

use serde::Serialize;
use wf_core::{Diagnostic, Severity};
use wf_graph::PortSpec;
use wf_water::StreamState;

use crate::error::{EquipmentError, EquipmentResult};
use crate::metrics::EquipmentMetrics;

/// Stream states keyed by port name.
///
/// Used for both sides of an evaluation. Ordered so that iteration is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortStreams(BTreeMap<&'static str, StreamState>);

impl PortStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, port: &'static str, state: StreamState) -> Self {
        self.0.insert(port, state);
        self
    }

    pub fn insert(&mut self, port: &'static str, state: StreamState) {
        self.0.insert(port, state);
    }

    pub fn get(&self, port: &str) -> Option<&StreamState> {
        self.0.get(port)
    }

    /// State on a port that must be present.
    pub fn require(&self, port: &'static str) -> EquipmentResult<&StreamState> {
        self.0.get(port).ok_or(EquipmentError::MissingInlet { port })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &StreamState)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn states(&self) -> Vec<&StreamState> {
        self.0.values().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total volumetric flow, m³/h.
    pub fn total_flow(&self) -> f64 {
        self.0.values().map(|s| s.flow_rate).sum()
    }

    /// Total mass flow, kg/h.
    pub fn total_mass_flow(&self) -> f64 {
        self.0.values().map(StreamState::mass_flow).sum()
    }
}

/// A derived value that breaches an engineering limit.
///
/// Violations never stop a solve; they become physical-constraint
/// diagnostics on the result.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalViolation {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl PhysicalViolation {
    pub fn new(code: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
        }
    }

    pub fn to_diagnostic(&self, equipment_id: &str) -> Diagnostic {
        Diagnostic::physical(self.severity, self.code, self.message.clone()).on(equipment_id)
    }
}

/// Everything a model produces for one set of inlet states.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// One state per outlet port, connected or not.
    pub outlets: PortStreams,
    pub metrics: EquipmentMetrics,
    pub violations: Vec<PhysicalViolation>,
    /// Mass stored inside the equipment, kg/h (positive when filling).
    pub accumulation: f64,
    /// Mass exchanged with the outside world, kg/h: positive when water
    /// leaves the flowsheet (sinks), negative when it enters (sources).
    pub external: f64,
}

impl Evaluation {
    pub fn new(outlets: PortStreams, metrics: impl Into<EquipmentMetrics>) -> Self {
        Self {
            outlets,
            metrics: metrics.into(),
            violations: Vec::new(),
            accumulation: 0.0,
            external: 0.0,
        }
    }

    pub fn with_violations(mut self, violations: Vec<PhysicalViolation>) -> Self {
        self.violations = violations;
        self
    }

    /// Mass balance of this evaluation against the inlets it was fed.
    pub fn balance(&self, inlets: &PortStreams) -> MassBalance {
        MassBalance::new(
            inlets.total_mass_flow(),
            self.outlets.total_mass_flow(),
            self.accumulation,
            self.external,
        )
    }
}

/// Per-equipment mass balance, kg/h.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassBalance {
    pub inflow: f64,
    pub outflow: f64,
    pub accumulation: f64,
    pub external: f64,
}

impl MassBalance {
    pub fn new(inflow: f64, outflow: f64, accumulation: f64, external: f64) -> Self {
        Self {
            inflow,
            outflow,
            accumulation,
            external,
        }
    }

    /// in − out − accumulation − external.
    pub fn residual(&self) -> f64 {
        self.inflow - self.outflow - self.accumulation - self.external
    }

    /// Residual relative to the largest of the flows in, out or across the
    /// flowsheet boundary.
    pub fn relative_error(&self) -> f64 {
        let reference = self.inflow.max(self.outflow).max(self.external.abs());
        if reference <= wf_core::FLOW_EPSILON {
            return 0.0;
        }
        self.residual().abs() / reference
    }

    pub fn closes(&self, tolerance: f64) -> bool {
        self.relative_error() <= tolerance
    }
}

/// An equipment model: a pure map from inlet states to outlet states.
///
/// Implementations must be deterministic and must not keep state between
/// calls; fouling history and similar inputs arrive through configuration.
pub trait EquipmentModel: Send + Sync {
    /// Type tag as used in requests, e.g. `"membrane"`.
    fn type_name(&self) -> &'static str;

    /// Fixed port layout, inlets first.
    fn ports(&self) -> &'static [PortSpec];

    /// Compute outlet states, metrics and violations.
    fn evaluate(&self, inlets: &PortStreams) -> EquipmentResult<Evaluation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_streams_totals() {
        let s = StreamState::seed().with_flow(10.0);
        let ports = PortStreams::new().with("a", s).with("b", s.with_flow(5.0));
        assert_eq!(ports.len(), 2);
        assert_eq!(ports.total_flow(), 15.0);
        assert!(ports.total_mass_flow() > 14_000.0);
        assert!(ports.require("c").is_err());
        assert_eq!(ports.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn balance_relative_error() {
        let b = MassBalance::new(1000.0, 990.0, 5.0, 0.0);
        assert!((b.residual() - 5.0).abs() < 1e-12);
        assert!((b.relative_error() - 0.005).abs() < 1e-12);
        assert!(!b.closes(1e-3));
        assert!(b.closes(1e-2));
    }

    #[test]
    fn source_balance_uses_outflow() {
        let b = MassBalance::new(0.0, 500.0, 0.0, -500.0);
        assert_eq!(b.relative_error(), 0.0);
        assert_eq!(MassBalance::new(0.0, 0.0, 0.0, 0.0).relative_error(), 0.0);
    }

    #[test]
    fn starved_sink_is_measured_against_what_it_reported() {
        // Nothing arrives on the stream, yet the sink reported 400 kg/h leaving.
        let b = MassBalance::new(0.0, 0.0, 0.0, 400.0);
        assert_eq!(b.relative_error(), 1.0);
    }

    #[test]
    fn violation_becomes_physical_diagnostic() {
        let v = PhysicalViolation::new(wf_core::codes::HIGH_FLUX, Severity::Error, "too fast");
        let d = v.to_diagnostic("UF-1");
        assert_eq!(d.class, wf_core::DiagnosticClass::PhysicalConstraint);
        assert_eq!(d.equipment_id.as_deref(), Some("UF-1"));
    }
}
