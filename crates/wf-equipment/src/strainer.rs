//! Mesh strainer.
//!
//! Pressure drop follows a loss coefficient that grows as the mesh gets
//! finer. A fixed fraction of the flow is bled to drain and carries every
//! solid the screen removes, so solids are conserved across the strainer.

use serde::{Deserialize, Serialize};
use wf_core::units::constants::AMBIENT_PRESSURE_BAR;
use wf_core::FLOW_EPSILON;
use wf_graph::PortSpec;
use wf_water::{Parameter, StreamState, density};

use crate::common::{kinds, load_kg_per_h, pipe_velocity};
use crate::error::EquipmentResult;
use crate::metrics::StrainerMetrics;
use crate::traits::{EquipmentModel, Evaluation, PortStreams};

pub const INLET: &str = "inlet";
pub const OUTLET: &str = "outlet";
pub const DRAIN: &str = "drain";

pub(crate) const PORTS: &[PortSpec] = &[
    PortSpec::inlet(INLET, kinds::RAW),
    PortSpec::outlet(OUTLET, kinds::RAW),
    PortSpec::outlet(DRAIN, kinds::DRAIN).rated(0.05, 10.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrainerConfig {
    /// Mesh opening, µm.
    pub mesh_um: f64,
    /// Share of the inflow bled to drain.
    pub drain_fraction: f64,
    /// Body bore used for the velocity head, m.
    pub diameter_m: f64,
}

impl Default for StrainerConfig {
    fn default() -> Self {
        Self {
            mesh_um: 100.0,
            drain_fraction: 0.02,
            diameter_m: 0.15,
        }
    }
}

impl StrainerConfig {
    /// Fraction of the incoming solids load captured by the screen.
    pub fn removal_efficiency(&self) -> f64 {
        match self.mesh_um {
            m if m <= 50.0 => 0.9,
            m if m <= 100.0 => 0.75,
            m if m <= 200.0 => 0.6,
            m if m <= 500.0 => 0.4,
            _ => 0.2,
        }
    }

    /// Loss coefficient ξ.
    pub fn loss_coefficient(&self) -> f64 {
        1.5 + 150.0 / self.mesh_um.max(1.0)
    }
}

impl EquipmentModel for StrainerConfig {
    fn type_name(&self) -> &'static str {
        "strainer"
    }

    fn ports(&self) -> &'static [PortSpec] {
        PORTS
    }

    fn evaluate(&self, inlets: &PortStreams) -> EquipmentResult<Evaluation> {
        let feed = inlets.require(INLET)?;
        let q = feed.flow_rate;
        let v = pipe_velocity(q, self.diameter_m);
        let dp_bar = self.loss_coefficient() * density(feed.temperature) * v * v / 2.0 / 1e5;

        let drain_flow = q * self.drain_fraction.clamp(0.0, 1.0);
        let outlet_flow = q - drain_flow;
        // No drain flow, nowhere to put solids; no outlet flow, everything
        // leaves through the drain.
        let efficiency = if drain_flow <= FLOW_EPSILON {
            0.0
        } else if outlet_flow <= FLOW_EPSILON {
            1.0
        } else {
            self.removal_efficiency()
        };

        // Removed load moves from the outlet to the drain.
        let outlet_factor = if outlet_flow > FLOW_EPSILON {
            (1.0 - efficiency) * q / outlet_flow
        } else {
            1.0
        };
        let drain_factor = if drain_flow > FLOW_EPSILON {
            efficiency * q / drain_flow
        } else {
            1.0
        };
        let solids = |factor: f64| {
            move |p: Parameter| match p {
                Parameter::Tss | Parameter::Turbidity => factor,
                _ => 1.0,
            }
        };

        let outlet = StreamState {
            flow_rate: outlet_flow,
            pressure: (feed.pressure - dp_bar).max(0.0),
            concentration: feed.concentration * outlet_factor,
            quality: feed.quality.scaled_by(solids(outlet_factor)),
            ..*feed
        };
        let drain = StreamState {
            flow_rate: drain_flow,
            pressure: AMBIENT_PRESSURE_BAR,
            concentration: feed.concentration * drain_factor,
            quality: feed.quality.scaled_by(solids(drain_factor)),
            ..*feed
        };

        let metrics = StrainerMetrics {
            pressure_drop: dp_bar,
            velocity: v,
            removal_efficiency: efficiency,
            outlet_flow,
            drain_flow,
            solids_removed: load_kg_per_h(q, feed.quality.tss) * efficiency,
        };
        let outlets = PortStreams::new().with(OUTLET, outlet).with(DRAIN, drain);
        Ok(Evaluation::new(outlets, metrics))
    }
}
