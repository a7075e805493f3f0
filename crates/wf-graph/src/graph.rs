//! Core graph data structures.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use wf_core::{EquipId, PortId, StreamId};

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Inlet,
    Outlet,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Inlet => f.write_str("inlet"),
            PortDirection::Outlet => f.write_str("outlet"),
        }
    }
}

/// Kind of water a port can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Raw,
    Permeate,
    Concentrate,
    Drain,
}

/// Static description of one port of an equipment type.
///
/// Port layouts are fixed per equipment type, so specs are `const` tables
/// owned by the equipment library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortSpec {
    pub name: &'static str,
    pub direction: PortDirection,
    pub compatible: &'static [StreamKind],
    /// Nominal bore, used for velocity checks.
    pub diameter_m: f64,
    /// Pressure rating of the connection.
    pub max_pressure_bar: f64,
    /// Inlets only: must have a producer or an external feed.
    pub required: bool,
}

impl PortSpec {
    pub const DEFAULT_DIAMETER_M: f64 = 0.15;
    pub const DEFAULT_MAX_PRESSURE_BAR: f64 = 10.0;

    /// A required inlet with default rating.
    pub const fn inlet(name: &'static str, compatible: &'static [StreamKind]) -> Self {
        Self {
            name,
            direction: PortDirection::Inlet,
            compatible,
            diameter_m: Self::DEFAULT_DIAMETER_M,
            max_pressure_bar: Self::DEFAULT_MAX_PRESSURE_BAR,
            required: true,
        }
    }

    /// An outlet with default rating.
    pub const fn outlet(name: &'static str, compatible: &'static [StreamKind]) -> Self {
        Self {
            name,
            direction: PortDirection::Outlet,
            compatible,
            diameter_m: Self::DEFAULT_DIAMETER_M,
            max_pressure_bar: Self::DEFAULT_MAX_PRESSURE_BAR,
            required: false,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn rated(mut self, diameter_m: f64, max_pressure_bar: f64) -> Self {
        self.diameter_m = diameter_m;
        self.max_pressure_bar = max_pressure_bar;
        self
    }

    /// True if both ports can carry at least one common stream kind.
    pub fn accepts_any(&self, other: &PortSpec) -> bool {
        self.compatible.iter().any(|k| other.compatible.contains(k))
    }
}

/// An equipment instance in the flowsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentNode {
    pub id: EquipId,
    /// External (request) id.
    pub name: String,
    /// Equipment type tag, e.g. `"membrane"`.
    pub kind: String,
    /// Ports in layout order: inlets first, then outlets.
    pub ports: Vec<PortId>,
}

/// A port instance owned by one equipment.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: PortId,
    pub equipment: EquipId,
    pub spec: PortSpec,
    /// Connection attached to this port, if any.
    pub stream: Option<StreamId>,
    /// Inlet fed from outside the flowsheet.
    pub boundary: bool,
}

impl Port {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn direction(&self) -> PortDirection {
        self.spec.direction
    }
}

/// A directed connection from an outlet port to an inlet port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub id: StreamId,
    /// External (request) id.
    pub name: String,
    pub source: PortId,
    pub target: PortId,
    pub source_equipment: EquipId,
    pub target_equipment: EquipId,
}

/// A validated, immutable flowsheet graph.
///
/// Equipment, ports and streams live in vectors indexed by their ids.
#[derive(Debug, Clone)]
pub struct FlowsheetGraph {
    pub(crate) equipment: Vec<EquipmentNode>,
    pub(crate) ports: Vec<Port>,
    pub(crate) streams: Vec<Stream>,
    pub(crate) equipment_by_name: BTreeMap<String, EquipId>,
    pub(crate) streams_by_name: BTreeMap<String, StreamId>,
}

impl FlowsheetGraph {
    pub fn equipment(&self) -> &[EquipmentNode] {
        &self.equipment
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn equipment_node(&self, id: EquipId) -> Option<&EquipmentNode> {
        self.equipment.get(id.idx())
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.idx())
    }

    pub fn stream(&self, id: StreamId) -> Option<&Stream> {
        self.streams.get(id.idx())
    }

    /// Look up equipment by its external id.
    pub fn find_equipment(&self, name: &str) -> Option<EquipId> {
        self.equipment_by_name.get(name).copied()
    }

    /// Look up a connection by its external id.
    pub fn find_stream(&self, name: &str) -> Option<StreamId> {
        self.streams_by_name.get(name).copied()
    }

    /// Find a port of an equipment by name.
    pub fn port_by_name(&self, equipment: EquipId, name: &str) -> Option<&Port> {
        self.equipment_node(equipment)?
            .ports
            .iter()
            .filter_map(|&p| self.port(p))
            .find(|p| p.name() == name)
    }

    /// Ports of one direction, in layout order.
    pub fn ports_of(&self, equipment: EquipId, direction: PortDirection) -> Vec<&Port> {
        match self.equipment_node(equipment) {
            Some(node) => node
                .ports
                .iter()
                .filter_map(|&p| self.port(p))
                .filter(|p| p.direction() == direction)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Streams entering an equipment, in inlet-port order.
    pub fn inlet_streams(&self, equipment: EquipId) -> Vec<StreamId> {
        self.ports_of(equipment, PortDirection::Inlet)
            .into_iter()
            .filter_map(|p| p.stream)
            .collect()
    }

    /// Streams leaving an equipment, in outlet-port order.
    pub fn outlet_streams(&self, equipment: EquipId) -> Vec<StreamId> {
        self.ports_of(equipment, PortDirection::Outlet)
            .into_iter()
            .filter_map(|p| p.stream)
            .collect()
    }

    /// Upstream equipment, deduplicated and sorted by id.
    pub fn predecessors(&self, equipment: EquipId) -> Vec<EquipId> {
        let mut out: Vec<EquipId> = self
            .inlet_streams(equipment)
            .into_iter()
            .filter_map(|s| self.stream(s))
            .map(|s| s.source_equipment)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Downstream equipment, deduplicated and sorted by id.
    pub fn successors(&self, equipment: EquipId) -> Vec<EquipId> {
        let mut out: Vec<EquipId> = self
            .outlet_streams(equipment)
            .into_iter()
            .filter_map(|s| self.stream(s))
            .map(|s| s.target_equipment)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Inlet ports that receive an external feed.
    pub fn boundary_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &[StreamKind] = &[StreamKind::Raw];
    const TREATED: &[StreamKind] = &[StreamKind::Permeate, StreamKind::Raw];
    const DRAIN: &[StreamKind] = &[StreamKind::Drain];

    #[test]
    fn port_spec_compatibility() {
        let out = PortSpec::outlet("outlet", RAW);
        assert!(out.accepts_any(&PortSpec::inlet("inlet", TREATED)));
        assert!(!out.accepts_any(&PortSpec::inlet("inlet", DRAIN)));
    }

    #[test]
    fn port_spec_builders() {
        let p = PortSpec::inlet("return", RAW).optional().rated(0.05, 6.0);
        assert!(!p.required);
        assert_eq!(p.diameter_m, 0.05);
        assert_eq!(p.max_pressure_bar, 6.0);
        assert_eq!(p.direction, PortDirection::Inlet);
        assert!(!PortSpec::outlet("outlet", RAW).required);
    }

    #[test]
    fn direction_display() {
        assert_eq!(PortDirection::Inlet.to_string(), "inlet");
        assert_eq!(PortDirection::Outlet.to_string(), "outlet");
    }
}
