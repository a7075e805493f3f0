//! Fixed-ratio flow splitter.

use serde::{Deserialize, Serialize};
use wf_graph::PortSpec;

use crate::common::kinds;
use crate::error::EquipmentResult;
use crate::metrics::SplitterMetrics;
use crate::traits::{EquipmentModel, Evaluation, PortStreams};

pub const INLET: &str = "inlet";
pub const OUTLET: &str = "outlet";
pub const BLEED: &str = "bleed";

pub(crate) const PORTS: &[PortSpec] = &[
    PortSpec::inlet(INLET, kinds::PROCESS),
    PortSpec::outlet(OUTLET, kinds::PROCESS),
    PortSpec::outlet(BLEED, kinds::PROCESS),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitterConfig {
    /// Share of the inflow sent to `bleed`.
    pub split_fraction: f64,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self { split_fraction: 0.5 }
    }
}

impl EquipmentModel for SplitterConfig {
    fn type_name(&self) -> &'static str {
        "splitter"
    }

    fn ports(&self) -> &'static [PortSpec] {
        PORTS
    }

    fn evaluate(&self, inlets: &PortStreams) -> EquipmentResult<Evaluation> {
        let feed = inlets.require(INLET)?;
        let fraction = self.split_fraction.clamp(0.0, 1.0);
        let bleed = feed.flow_rate * fraction;
        let outlet = feed.flow_rate - bleed;
        let metrics = SplitterMetrics {
            inflow: feed.flow_rate,
            outlet_flow: outlet,
            bleed_flow: bleed,
            split_fraction: fraction,
        };
        let outlets = PortStreams::new()
            .with(OUTLET, feed.with_flow(outlet))
            .with(BLEED, feed.with_flow(bleed));
        Ok(Evaluation::new(outlets, metrics))
    }
}
