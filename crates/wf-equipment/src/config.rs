//! The closed set of equipment types and their typed configurations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wf_graph::PortSpec;

use crate::error::{EquipmentError, EquipmentResult};
use crate::feed_source::{self, FeedSourceConfig};
use crate::membrane::{self, MembraneConfig};
use crate::pump::{self, PumpConfig};
use crate::sink::{self, Sink, SinkConfig, SinkKind};
use crate::splitter::{self, SplitterConfig};
use crate::strainer::{self, StrainerConfig};
use crate::tank::{self, TankConfig};
use crate::traits::{EquipmentModel, Evaluation, PortStreams};

/// Equipment type without its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EquipmentKind {
    FeedSource,
    Tank,
    Pump,
    Strainer,
    Membrane,
    Splitter,
    Product,
    Waste,
}

impl EquipmentKind {
    pub const ALL: [EquipmentKind; 8] = [
        EquipmentKind::FeedSource,
        EquipmentKind::Tank,
        EquipmentKind::Pump,
        EquipmentKind::Strainer,
        EquipmentKind::Membrane,
        EquipmentKind::Splitter,
        EquipmentKind::Product,
        EquipmentKind::Waste,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EquipmentKind::FeedSource => "feed_source",
            EquipmentKind::Tank => "tank",
            EquipmentKind::Pump => "pump",
            EquipmentKind::Strainer => "strainer",
            EquipmentKind::Membrane => "membrane",
            EquipmentKind::Splitter => "splitter",
            EquipmentKind::Product => "product",
            EquipmentKind::Waste => "waste",
        }
    }

    /// Fixed port layout, inlets first.
    pub fn ports(self) -> &'static [PortSpec] {
        match self {
            EquipmentKind::FeedSource => feed_source::PORTS,
            EquipmentKind::Tank => tank::PORTS,
            EquipmentKind::Pump => pump::PORTS,
            EquipmentKind::Strainer => strainer::PORTS,
            EquipmentKind::Membrane => membrane::PORTS,
            EquipmentKind::Splitter => splitter::PORTS,
            EquipmentKind::Product => sink::PRODUCT_PORTS,
            EquipmentKind::Waste => sink::WASTE_PORTS,
        }
    }
}

impl fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EquipmentKind {
    type Err = EquipmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ultrafiltration" {
            return Ok(EquipmentKind::Membrane);
        }
        EquipmentKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or(EquipmentError::InvalidArg {
                what: "unknown equipment type",
            })
    }
}

/// Typed configuration of one equipment, tagged by type.
///
/// Serialized as `{"type": "...", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum EquipmentConfig {
    FeedSource(FeedSourceConfig),
    Tank(TankConfig),
    Pump(PumpConfig),
    Strainer(StrainerConfig),
    #[serde(alias = "ultrafiltration")]
    Membrane(MembraneConfig),
    Splitter(SplitterConfig),
    Product(SinkConfig),
    Waste(SinkConfig),
}

impl EquipmentConfig {
    pub fn kind(&self) -> EquipmentKind {
        match self {
            EquipmentConfig::FeedSource(_) => EquipmentKind::FeedSource,
            EquipmentConfig::Tank(_) => EquipmentKind::Tank,
            EquipmentConfig::Pump(_) => EquipmentKind::Pump,
            EquipmentConfig::Strainer(_) => EquipmentKind::Strainer,
            EquipmentConfig::Membrane(_) => EquipmentKind::Membrane,
            EquipmentConfig::Splitter(_) => EquipmentKind::Splitter,
            EquipmentConfig::Product(_) => EquipmentKind::Product,
            EquipmentConfig::Waste(_) => EquipmentKind::Waste,
        }
    }

    /// Default configuration for a type.
    pub fn default_for(kind: EquipmentKind) -> Self {
        match kind {
            EquipmentKind::FeedSource => EquipmentConfig::FeedSource(Default::default()),
            EquipmentKind::Tank => EquipmentConfig::Tank(Default::default()),
            EquipmentKind::Pump => EquipmentConfig::Pump(Default::default()),
            EquipmentKind::Strainer => EquipmentConfig::Strainer(Default::default()),
            EquipmentKind::Membrane => EquipmentConfig::Membrane(Default::default()),
            EquipmentKind::Splitter => EquipmentConfig::Splitter(Default::default()),
            EquipmentKind::Product => EquipmentConfig::Product(Default::default()),
            EquipmentKind::Waste => EquipmentConfig::Waste(Default::default()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn ports(&self) -> &'static [PortSpec] {
        self.kind().ports()
    }

    /// Evaluate the model behind this configuration.
    pub fn evaluate(&self, inlets: &PortStreams) -> EquipmentResult<Evaluation> {
        match self {
            EquipmentConfig::FeedSource(c) => c.evaluate(inlets),
            EquipmentConfig::Tank(c) => c.evaluate(inlets),
            EquipmentConfig::Pump(c) => c.evaluate(inlets),
            EquipmentConfig::Strainer(c) => c.evaluate(inlets),
            EquipmentConfig::Membrane(c) => c.evaluate(inlets),
            EquipmentConfig::Splitter(c) => c.evaluate(inlets),
            EquipmentConfig::Product(c) => Sink {
                kind: SinkKind::Product,
                config: c,
            }
            .evaluate(inlets),
            EquipmentConfig::Waste(c) => Sink {
                kind: SinkKind::Waste,
                config: c,
            }
            .evaluate(inlets),
        }
    }
}
