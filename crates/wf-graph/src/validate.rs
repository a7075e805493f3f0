//! Whole-graph checks run by `GraphBuilder::build`.

use crate::error::GraphError;
use crate::graph::{EquipmentNode, Port, PortDirection};

/// Every required inlet needs exactly one source: a connection or an
/// external feed, never both.
pub(crate) fn validate_inlets(equipment: &[EquipmentNode], ports: &[Port]) -> Vec<GraphError> {
    let mut errors = Vec::new();
    for node in equipment {
        for port in node.ports.iter().map(|p| &ports[p.idx()]) {
            if port.direction() != PortDirection::Inlet {
                continue;
            }
            match (port.stream.is_some(), port.boundary) {
                (true, true) => errors.push(GraphError::BoundaryConflict {
                    equipment: node.name.clone(),
                    port: port.name().to_string(),
                    reason: "inlet already has a producer",
                }),
                (false, false) if port.spec.required => {
                    errors.push(GraphError::DisconnectedInlet {
                        equipment: node.name.clone(),
                        port: port.name().to_string(),
                    })
                }
                _ => {}
            }
        }
    }
    errors
}
