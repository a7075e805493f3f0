//! Terminal sinks: treated-water product and waste.

use serde::{Deserialize, Serialize};
use wf_graph::PortSpec;

use crate::common::kinds;
use crate::error::EquipmentResult;
use crate::metrics::{EquipmentMetrics, SinkMetrics};
use crate::traits::{EquipmentModel, Evaluation, PortStreams};

pub const INLET: &str = "inlet";

pub(crate) const PRODUCT_PORTS: &[PortSpec] = &[PortSpec::inlet(INLET, kinds::PRODUCT)];
pub(crate) const WASTE_PORTS: &[PortSpec] = &[PortSpec::inlet(INLET, kinds::REJECT)];

/// Where the water ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Product,
    Waste,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SinkConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A sink config bound to its kind.
#[derive(Debug, Clone, Copy)]
pub struct Sink<'a> {
    pub kind: SinkKind,
    pub config: &'a SinkConfig,
}

impl EquipmentModel for Sink<'_> {
    fn type_name(&self) -> &'static str {
        match self.kind {
            SinkKind::Product => "product",
            SinkKind::Waste => "waste",
        }
    }

    fn ports(&self) -> &'static [PortSpec] {
        match self.kind {
            SinkKind::Product => PRODUCT_PORTS,
            SinkKind::Waste => WASTE_PORTS,
        }
    }

    fn evaluate(&self, inlets: &PortStreams) -> EquipmentResult<Evaluation> {
        let inlet = inlets.require(INLET)?;
        let received = SinkMetrics {
            flow_rate: inlet.flow_rate,
            pressure: inlet.pressure,
            temperature: inlet.temperature,
            concentration: inlet.concentration,
            quality: inlet.quality,
        };
        let metrics = match self.kind {
            SinkKind::Product => EquipmentMetrics::Product(received),
            SinkKind::Waste => EquipmentMetrics::Waste(received),
        };
        let mut eval = Evaluation::new(PortStreams::new(), metrics);
        eval.external = inlet.mass_flow();
        Ok(eval)
    }
}
