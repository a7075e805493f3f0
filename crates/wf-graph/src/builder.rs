//! Incremental graph builder.

use std::collections::BTreeMap;

use wf_core::{EquipId, PortId, StreamId};

use crate::error::{GraphError, GraphResult};
use crate::graph::{EquipmentNode, FlowsheetGraph, Port, PortDirection, PortSpec, Stream};
use crate::validate;

/// Builder for a flowsheet graph.
///
/// `add_equipment`, `connect` and `mark_boundary` check their arguments
/// immediately and leave the builder untouched on error, so a caller can
/// keep going and collect every problem. `build()` runs the whole-graph
/// checks and freezes the result.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    equipment: Vec<EquipmentNode>,
    ports: Vec<Port>,
    streams: Vec<Stream>,
    equipment_by_name: BTreeMap<String, EquipId>,
    streams_by_name: BTreeMap<String, StreamId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equipment with its port layout and return its id.
    pub fn add_equipment(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        layout: &[PortSpec],
    ) -> GraphResult<EquipId> {
        let name = name.into();
        if self.equipment_by_name.contains_key(&name) {
            return Err(GraphError::DuplicateEquipment { equipment: name });
        }

        let id = EquipId::from_index(self.equipment.len() as u32);
        let mut port_ids = Vec::with_capacity(layout.len());
        for spec in layout {
            let pid = PortId::from_index(self.ports.len() as u32);
            self.ports.push(Port {
                id: pid,
                equipment: id,
                spec: *spec,
                stream: None,
                boundary: false,
            });
            port_ids.push(pid);
        }

        self.equipment_by_name.insert(name.clone(), id);
        self.equipment.push(EquipmentNode {
            id,
            name,
            kind: kind.into(),
            ports: port_ids,
        });
        Ok(id)
    }

    /// Connect an outlet port to an inlet port.
    pub fn connect(
        &mut self,
        stream: impl Into<String>,
        source_equipment: &str,
        source_port: &str,
        target_equipment: &str,
        target_port: &str,
    ) -> GraphResult<StreamId> {
        let stream = stream.into();
        if self.streams_by_name.contains_key(&stream) {
            return Err(GraphError::DuplicateStream { stream });
        }

        let context = format!("Connection '{}'", stream);
        let src = self.resolve(&context, source_equipment, source_port)?;
        let tgt = self.resolve(&context, target_equipment, target_port)?;

        let (src_port, tgt_port) = (&self.ports[src.idx()], &self.ports[tgt.idx()]);
        if src_port.direction() != PortDirection::Outlet {
            return Err(GraphError::WrongDirection {
                stream,
                equipment: source_equipment.to_string(),
                port: source_port.to_string(),
                expected: PortDirection::Outlet,
            });
        }
        if tgt_port.direction() != PortDirection::Inlet {
            return Err(GraphError::WrongDirection {
                stream,
                equipment: target_equipment.to_string(),
                port: target_port.to_string(),
                expected: PortDirection::Inlet,
            });
        }
        if src_port.equipment == tgt_port.equipment {
            return Err(GraphError::SelfConnection {
                stream,
                equipment: source_equipment.to_string(),
            });
        }
        if !src_port.spec.accepts_any(&tgt_port.spec) {
            return Err(GraphError::IncompatiblePorts {
                stream,
                source: format!("{}.{}", source_equipment, source_port),
                target: format!("{}.{}", target_equipment, target_port),
            });
        }
        for (port, equipment, name) in [
            (src_port, source_equipment, source_port),
            (tgt_port, target_equipment, target_port),
        ] {
            if let Some(existing) = port.stream {
                return Err(GraphError::PortAlreadyConnected {
                    stream,
                    equipment: equipment.to_string(),
                    port: name.to_string(),
                    existing: self.streams[existing.idx()].name.clone(),
                });
            }
        }

        let id = StreamId::from_index(self.streams.len() as u32);
        let (source_eq, target_eq) = (src_port.equipment, tgt_port.equipment);
        self.ports[src.idx()].stream = Some(id);
        self.ports[tgt.idx()].stream = Some(id);
        self.streams_by_name.insert(stream.clone(), id);
        self.streams.push(Stream {
            id,
            name: stream,
            source: src,
            target: tgt,
            source_equipment: source_eq,
            target_equipment: target_eq,
        });
        Ok(id)
    }

    /// Declare that an inlet port is fed from outside the flowsheet.
    pub fn mark_boundary(&mut self, equipment: &str, port: &str) -> GraphResult<PortId> {
        let pid = self.resolve("External feed", equipment, port)?;
        if self.ports[pid.idx()].direction() != PortDirection::Inlet {
            return Err(GraphError::BoundaryConflict {
                equipment: equipment.to_string(),
                port: port.to_string(),
                reason: "port is not an inlet",
            });
        }
        self.ports[pid.idx()].boundary = true;
        Ok(pid)
    }

    /// Run the whole-graph checks and freeze the graph.
    ///
    /// Every problem found is returned, in equipment then port order.
    pub fn build(self) -> Result<FlowsheetGraph, Vec<GraphError>> {
        let errors = validate::validate_inlets(&self.equipment, &self.ports);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(FlowsheetGraph {
            equipment: self.equipment,
            ports: self.ports,
            streams: self.streams,
            equipment_by_name: self.equipment_by_name,
            streams_by_name: self.streams_by_name,
        })
    }

    fn resolve(&self, context: &str, equipment: &str, port: &str) -> GraphResult<PortId> {
        let eq = self.equipment_by_name.get(equipment).ok_or_else(|| {
            GraphError::UnknownEquipment {
                context: context.to_string(),
                equipment: equipment.to_string(),
            }
        })?;
        self.equipment[eq.idx()]
            .ports
            .iter()
            .copied()
            .find(|p| self.ports[p.idx()].name() == port)
            .ok_or_else(|| GraphError::UnknownPort {
                context: context.to_string(),
                equipment: equipment.to_string(),
                port: port.to_string(),
            })
    }
}
