//! Atmospheric buffer tank.
//!
//! Mixes every inlet, holds a volume of water and releases it at a
//! set-point (or at the inflow rate). Level changes over the projection
//! horizon `dt_h` are the only accumulation term in the flowsheet.

use serde::{Deserialize, Serialize};
use wf_core::units::constants::AMBIENT_PRESSURE_BAR;
use wf_core::{Severity, codes};
use wf_graph::PortSpec;
use wf_water::{Parameter, StreamState, density, mix};

use crate::common::{check_finite, hydrostatic_bar, kinds};
use crate::error::{EquipmentError, EquipmentResult};
use crate::metrics::TankMetrics;
use crate::traits::{EquipmentModel, Evaluation, PhysicalViolation, PortStreams};

pub const INLET: &str = "inlet";
pub const RETURN: &str = "return";
pub const OUTLET: &str = "outlet";
pub const OVERFLOW: &str = "overflow";

pub(crate) const PORTS: &[PortSpec] = &[
    PortSpec::inlet(INLET, kinds::PROCESS),
    PortSpec::inlet(RETURN, kinds::PROCESS).optional(),
    PortSpec::outlet(OUTLET, kinds::PROCESS),
    PortSpec::outlet(OVERFLOW, kinds::DRAIN),
];

const OVERFLOW_RISK_PCT: f64 = 90.0;
/// Settling starts to matter beyond this residence time, h.
const SETTLING_ONSET_H: f64 = 2.0;
const SETTLING_PER_HOUR: f64 = 0.05;
const MAX_SETTLING: f64 = 0.2;
/// Mean water age as a fraction of the residence time (well-mixed tank).
const WATER_AGE_FACTOR: f64 = 0.37;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TankConfig {
    /// m³
    pub volume: f64,
    /// m, used for the hydrostatic head at the outlet.
    pub height: f64,
    /// Current fill, % of volume.
    pub level: f64,
    /// Requested outlet flow, m³/h. Follows the inflow when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlet_setpoint: Option<f64>,
    /// Projection horizon for the level change, h.
    pub dt_h: f64,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            volume: 1000.0,
            height: 10.0,
            level: 75.0,
            outlet_setpoint: None,
            dt_h: 1.0,
        }
    }
}

impl TankConfig {
    /// Fraction of TSS that settles out at residence time `tau_h`.
    fn settling_efficiency(tau_h: f64) -> f64 {
        if tau_h > SETTLING_ONSET_H {
            (SETTLING_PER_HOUR * tau_h).min(MAX_SETTLING)
        } else {
            0.0
        }
    }
}

impl EquipmentModel for TankConfig {
    fn type_name(&self) -> &'static str {
        "tank"
    }

    fn ports(&self) -> &'static [PortSpec] {
        PORTS
    }

    fn evaluate(&self, inlets: &PortStreams) -> EquipmentResult<Evaluation> {
        if self.volume <= 0.0 || self.dt_h <= 0.0 {
            return Err(EquipmentError::InvalidArg {
                what: "tank volume and horizon must be positive",
            });
        }
        inlets.require(INLET)?;
        let mixed = mix(&inlets.states())?;
        let inflow = mixed.flow_rate;
        check_finite(inflow, "tank inflow")?;

        let stored = self.volume * self.level.clamp(0.0, 100.0) / 100.0;
        let demand = self.outlet_setpoint.unwrap_or(inflow).max(0.0);
        let drainable = (stored + inflow * self.dt_h) / self.dt_h;
        let outlet_flow = demand.min(drainable);

        let mut projected = stored + (inflow - outlet_flow) * self.dt_h;
        let overflow_flow = if projected > self.volume {
            let excess = (projected - self.volume) / self.dt_h;
            projected = self.volume;
            excess
        } else {
            0.0
        };
        let projected_level = projected / self.volume * 100.0;
        let accumulation = inflow - outlet_flow - overflow_flow;

        let residence_time = if inflow > 0.0 { stored / inflow } else { 0.0 };
        let settling = Self::settling_efficiency(residence_time);
        let quality = mixed.quality.scaled_by(|p| match p {
            Parameter::Tss => 1.0 - settling,
            Parameter::Turbidity => 1.0 - settling / 2.0,
            _ => 1.0,
        });

        let head = self.height.max(0.0) * projected_level / 100.0;
        let outlet = StreamState {
            flow_rate: outlet_flow,
            pressure: AMBIENT_PRESSURE_BAR + hydrostatic_bar(head, mixed.temperature),
            temperature: mixed.temperature,
            concentration: mixed.concentration * (1.0 - settling),
            quality,
        };
        let overflow = StreamState {
            flow_rate: overflow_flow,
            pressure: AMBIENT_PRESSURE_BAR,
            ..outlet
        };

        let mut violations = Vec::new();
        if overflow_flow > 0.0 {
            violations.push(PhysicalViolation::new(
                codes::TANK_OVERFLOW,
                Severity::Warning,
                format!("Tank overflows at {:.2} m³/h", overflow_flow),
            ));
        } else if projected_level > OVERFLOW_RISK_PCT {
            violations.push(PhysicalViolation::new(
                codes::OVERFLOW_RISK,
                Severity::Warning,
                format!("Projected level {:.1}% is close to overflow", projected_level),
            ));
        }
        if outlet_flow < demand {
            violations.push(PhysicalViolation::new(
                codes::TANK_DRAINED,
                Severity::Warning,
                format!(
                    "Tank cannot sustain {:.2} m³/h; outlet limited to {:.2} m³/h",
                    demand, outlet_flow
                ),
            ));
        }

        let metrics = TankMetrics {
            inflow,
            outlet_flow,
            overflow_flow,
            accumulation,
            water_volume: stored,
            residence_time,
            water_age: residence_time * WATER_AGE_FACTOR,
            projected_level,
            overflow_risk: projected_level > OVERFLOW_RISK_PCT,
            settling_efficiency: settling,
        };

        let outlets = PortStreams::new().with(OUTLET, outlet).with(OVERFLOW, overflow);
        let mut eval = Evaluation::new(outlets, metrics).with_violations(violations);
        eval.accumulation = accumulation * density(mixed.temperature);
        Ok(eval)
    }
}
