//! Graph-specific error types.

use crate::graph::PortDirection;
use wf_core::{Diagnostic, WfError, codes};

/// Result alias for single graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Topology errors raised while building a flowsheet graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two equipment share the same id.
    DuplicateEquipment { equipment: String },

    /// Two connections share the same id.
    DuplicateStream { stream: String },

    /// A connection or boundary refers to equipment that doesn't exist.
    UnknownEquipment { context: String, equipment: String },

    /// A connection or boundary refers to a port the equipment doesn't have.
    UnknownPort {
        context: String,
        equipment: String,
        port: String,
    },

    /// A connection uses an inlet as source or an outlet as target.
    WrongDirection {
        stream: String,
        equipment: String,
        port: String,
        expected: PortDirection,
    },

    /// Source and target ports share no stream kind.
    IncompatiblePorts {
        stream: String,
        source: String,
        target: String,
    },

    /// A port already takes part in another connection.
    PortAlreadyConnected {
        stream: String,
        equipment: String,
        port: String,
        existing: String,
    },

    /// A connection from an equipment straight back into itself.
    SelfConnection { stream: String, equipment: String },

    /// A required inlet has neither a producer nor an external feed.
    DisconnectedInlet { equipment: String, port: String },

    /// An external feed on a port that is connected or not an inlet.
    BoundaryConflict {
        equipment: String,
        port: String,
        reason: &'static str,
    },
}

impl GraphError {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::DuplicateEquipment { .. } | GraphError::UnknownEquipment { .. } => {
                codes::UNKNOWN_EQUIPMENT
            }
            GraphError::DuplicateStream { .. } | GraphError::PortAlreadyConnected { .. } => {
                codes::PORT_ALREADY_CONNECTED
            }
            GraphError::UnknownPort { .. } => codes::UNKNOWN_PORT,
            GraphError::WrongDirection { .. } => codes::PORT_DIRECTION,
            GraphError::IncompatiblePorts { .. } => codes::INCOMPATIBLE_PORTS,
            GraphError::SelfConnection { .. } => codes::SELF_CONNECTION,
            GraphError::DisconnectedInlet { .. } => codes::DISCONNECTED_INLET,
            GraphError::BoundaryConflict { .. } => codes::BOUNDARY_CONFLICT,
        }
    }

    /// Equipment the error is attached to, if any.
    pub fn equipment_id(&self) -> Option<&str> {
        match self {
            GraphError::DuplicateStream { .. } | GraphError::IncompatiblePorts { .. } => None,
            GraphError::DuplicateEquipment { equipment }
            | GraphError::UnknownEquipment { equipment, .. }
            | GraphError::UnknownPort { equipment, .. }
            | GraphError::WrongDirection { equipment, .. }
            | GraphError::PortAlreadyConnected { equipment, .. }
            | GraphError::SelfConnection { equipment, .. }
            | GraphError::DisconnectedInlet { equipment, .. }
            | GraphError::BoundaryConflict { equipment, .. } => Some(equipment),
        }
    }

    /// Topology diagnostic for the response contract.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let d = Diagnostic::topology(self.code(), self.to_string());
        match self.equipment_id() {
            Some(id) => d.on(id),
            None => d,
        }
    }
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateEquipment { equipment } => {
                write!(f, "Equipment '{}' is defined twice", equipment)
            }
            GraphError::DuplicateStream { stream } => {
                write!(f, "Connection '{}' is defined twice", stream)
            }
            GraphError::UnknownEquipment { context, equipment } => {
                write!(f, "{} refers to unknown equipment '{}'", context, equipment)
            }
            GraphError::UnknownPort {
                context,
                equipment,
                port,
            } => {
                write!(
                    f,
                    "{} refers to unknown port '{}' on equipment '{}'",
                    context, port, equipment
                )
            }
            GraphError::WrongDirection {
                stream,
                equipment,
                port,
                expected,
            } => {
                write!(
                    f,
                    "Connection '{}' uses port '{}.{}' which is not an {}",
                    stream, equipment, port, expected
                )
            }
            GraphError::IncompatiblePorts {
                stream,
                source,
                target,
            } => {
                write!(
                    f,
                    "Connection '{}': ports '{}' and '{}' accept no common stream kind",
                    stream, source, target
                )
            }
            GraphError::PortAlreadyConnected {
                stream,
                equipment,
                port,
                existing,
            } => {
                write!(
                    f,
                    "Connection '{}': port '{}.{}' is already used by '{}'",
                    stream, equipment, port, existing
                )
            }
            GraphError::SelfConnection { stream, equipment } => {
                write!(
                    f,
                    "Connection '{}' loops equipment '{}' back into itself",
                    stream, equipment
                )
            }
            GraphError::DisconnectedInlet { equipment, port } => {
                write!(
                    f,
                    "Required inlet '{}.{}' has no producer and no external feed",
                    equipment, port
                )
            }
            GraphError::BoundaryConflict {
                equipment,
                port,
                reason,
            } => {
                write!(f, "External feed on '{}.{}': {}", equipment, port, reason)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for WfError {
    fn from(err: GraphError) -> Self {
        WfError::Invariant {
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{DiagnosticClass, Severity};

    #[test]
    fn disconnected_inlet_diagnostic() {
        let err = GraphError::DisconnectedInlet {
            equipment: "UF-1".into(),
            port: "feed".into(),
        };
        let d = err.to_diagnostic();
        assert_eq!(d.code, codes::DISCONNECTED_INLET);
        assert_eq!(d.class, DiagnosticClass::Topology);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.equipment_id.as_deref(), Some("UF-1"));
        assert!(d.message.contains("UF-1.feed"));
    }

    #[test]
    fn incompatible_ports_has_no_equipment() {
        let err = GraphError::IncompatiblePorts {
            stream: "S1".into(),
            source: "A.outlet".into(),
            target: "B.inlet".into(),
        };
        assert!(err.equipment_id().is_none());
        let wf: WfError = err.into();
        assert!(matches!(wf, WfError::Invariant { .. }));
    }
}
