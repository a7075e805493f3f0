//! Centrifugal pump with a quadratic head curve.
//!
//! ## Model
//!
//! ```text
//! H_avail(Q) = H0 · (1 − (Q / Qmax)²)
//! H_req      = (P_discharge − P_suction) / (ρ g)
//! P_shaft    = ρ g Q H / η
//! ```
//!
//! The pump delivers the requested discharge pressure when the curve allows
//! it; otherwise discharge falls back to what the curve provides.

use serde::{Deserialize, Serialize};
use uom::si::power::kilowatt;
use wf_core::units::constants::G0_MPS2;
use wf_core::units::{Power, m3ph, pa};
use wf_core::{Severity, codes};
use wf_graph::PortSpec;
use wf_water::density;

use crate::common::{check_finite, head_m, kinds};
use crate::error::EquipmentResult;
use crate::metrics::PumpMetrics;
use crate::traits::{EquipmentModel, Evaluation, PhysicalViolation, PortStreams};

pub const SUCTION: &str = "suction";
pub const DISCHARGE: &str = "discharge";

pub(crate) const PORTS: &[PortSpec] = &[
    PortSpec::inlet(SUCTION, kinds::PROCESS),
    PortSpec::outlet(DISCHARGE, kinds::PROCESS).rated(0.15, 16.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PumpConfig {
    /// Requested discharge pressure, bar.
    pub discharge_pressure: f64,
    pub efficiency: f64,
    /// Head at zero flow, m.
    pub shutoff_head: f64,
    /// Flow at which the curve reaches zero head, m³/h.
    pub max_flow: f64,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            discharge_pressure: 3.0,
            efficiency: 0.75,
            shutoff_head: 50.0,
            max_flow: 200.0,
        }
    }
}

impl PumpConfig {
    /// Head the curve provides at `flow` (m³/h), never negative.
    pub fn available_head(&self, flow: f64) -> f64 {
        if self.max_flow <= 0.0 {
            return 0.0;
        }
        let r = flow / self.max_flow;
        (self.shutoff_head * (1.0 - r * r)).max(0.0)
    }
}

impl EquipmentModel for PumpConfig {
    fn type_name(&self) -> &'static str {
        "pump"
    }

    fn ports(&self) -> &'static [PortSpec] {
        PORTS
    }

    fn evaluate(&self, inlets: &PortStreams) -> EquipmentResult<Evaluation> {
        let suction = inlets.require(SUCTION)?;
        let q = suction.flow_rate;
        let rho = density(suction.temperature);

        let head_required = head_m(self.discharge_pressure - suction.pressure, suction.temperature);
        let head_available = self.available_head(q);
        let mut violations = Vec::new();

        if q > self.max_flow {
            violations.push(PhysicalViolation::new(
                codes::PUMP_RUNOUT,
                Severity::Error,
                format!(
                    "Flow {:.1} m³/h exceeds the pump maximum {:.1} m³/h",
                    q, self.max_flow
                ),
            ));
        }
        let head_delivered = if head_required < 0.0 {
            violations.push(PhysicalViolation::new(
                codes::PUMP_NEGATIVE_HEAD,
                Severity::Warning,
                format!(
                    "Suction pressure {:.2} bar already exceeds the requested discharge {:.2} bar",
                    suction.pressure, self.discharge_pressure
                ),
            ));
            0.0
        } else if head_required > head_available {
            violations.push(PhysicalViolation::new(
                codes::PUMP_ENVELOPE,
                Severity::Error,
                format!(
                    "Required head {:.1} m exceeds the {:.1} m available at {:.1} m³/h",
                    head_required, head_available, q
                ),
            ));
            head_available
        } else {
            head_required
        };

        let discharge_pressure = suction.pressure + rho * G0_MPS2 * head_delivered / 1e5;
        let hydraulic: Power = pa(rho * G0_MPS2 * head_delivered) * m3ph(q);
        let hydraulic_kw = hydraulic.get::<kilowatt>();
        let shaft_kw = if self.efficiency > 0.0 {
            hydraulic_kw / self.efficiency
        } else {
            0.0
        };
        check_finite(shaft_kw, "pump shaft power")?;

        let metrics = PumpMetrics {
            flow: q,
            suction_pressure: suction.pressure,
            discharge_pressure,
            head_required,
            head_available,
            head_delivered,
            hydraulic_power: hydraulic_kw,
            shaft_power: shaft_kw,
            efficiency: self.efficiency,
            specific_energy: if q > 0.0 { shaft_kw / q } else { 0.0 },
        };
        let outlets = PortStreams::new().with(DISCHARGE, suction.with_pressure(discharge_pressure));
        Ok(Evaluation::new(outlets, metrics).with_violations(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::EquipmentMetrics;
    use wf_water::StreamState;

    fn suction(flow: f64, pressure: f64) -> PortStreams {
        PortStreams::new().with(SUCTION, StreamState::seed().with_flow(flow).with_pressure(pressure))
    }

    fn metrics(e: &Evaluation) -> &PumpMetrics {
        match &e.metrics {
            EquipmentMetrics::Pump(m) => m,
            other => panic!("unexpected metrics {other:?}"),
        }
    }

    #[test]
    fn curve_shape() {
        let p = PumpConfig::default();
        assert_eq!(p.available_head(0.0), 50.0);
        assert!((p.available_head(100.0) - 37.5).abs() < 1e-12);
        assert_eq!(p.available_head(200.0), 0.0);
        assert_eq!(p.available_head(300.0), 0.0);
    }

    #[test]
    fn delivers_requested_pressure_inside_envelope() {
        let e = PumpConfig::default().evaluate(&suction(100.0, 1.0)).unwrap();
        let m = metrics(&e);
        assert!((m.discharge_pressure - 3.0).abs() < 1e-9);
        assert!(m.head_required > 20.0 && m.head_required < 21.0);
        assert!(m.shaft_power > m.hydraulic_power);
        assert!((m.hydraulic_power - 5.556).abs() < 0.01, "{}", m.hydraulic_power);
        assert!(e.violations.is_empty());
        let out = e.outlets.get(DISCHARGE).unwrap();
        assert_eq!(out.flow_rate, 100.0);
    }

    #[test]
    fn envelope_caps_discharge() {
        let cfg = PumpConfig {
            discharge_pressure: 10.0,
            ..PumpConfig::default()
        };
        let e = cfg.evaluate(&suction(100.0, 1.0)).unwrap();
        let m = metrics(&e);
        assert_eq!(m.head_delivered, m.head_available);
        assert!(m.discharge_pressure < 10.0);
        assert!(e.violations.iter().any(|v| v.code == codes::PUMP_ENVELOPE));
    }

    #[test]
    fn runout_and_negative_head() {
        let e = PumpConfig::default().evaluate(&suction(250.0, 1.0)).unwrap();
        assert!(e.violations.iter().any(|v| v.code == codes::PUMP_RUNOUT));

        let e = PumpConfig::default().evaluate(&suction(50.0, 4.0)).unwrap();
        assert!(e.violations.iter().any(|v| v.code == codes::PUMP_NEGATIVE_HEAD));
        assert_eq!(metrics(&e).shaft_power, 0.0);
        assert_eq!(e.outlets.get(DISCHARGE).unwrap().pressure, 4.0);
    }
}
