//! The uniform diagnostic record emitted by validation, the graph builder,
//! the equipment models and the solver.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Diagnostic severity. Ordered so `Critical` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Errors and criticals block a solve when raised before evaluation.
    pub fn is_blocking(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Error taxonomy a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticClass {
    /// Config value outside its declared domain; rejected before solving.
    Validation,
    /// Malformed connection graph; rejected before solving.
    Topology,
    /// Iteration budget, timeout or cancellation; result still returned.
    Convergence,
    /// Derived value breaches an engineering limit; result still returned.
    PhysicalConstraint,
}

/// `{code, message, equipmentId?, severity}` plus the taxonomy class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
    pub severity: Severity,
    pub class: DiagnosticClass,
}

impl Diagnostic {
    pub fn new(
        class: DiagnosticClass,
        severity: Severity,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            equipment_id: None,
            severity,
            class,
        }
    }

    pub fn validation(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticClass::Validation, severity, code, message)
    }

    pub fn topology(code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticClass::Topology, Severity::Error, code, message)
    }

    pub fn convergence(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticClass::Convergence, severity, code, message)
    }

    pub fn physical(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticClass::PhysicalConstraint, severity, code, message)
    }

    /// Attach the equipment the diagnostic refers to.
    pub fn on(mut self, equipment_id: impl Into<String>) -> Self {
        self.equipment_id = Some(equipment_id.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.equipment_id {
            Some(id) => write!(f, "[{}] {} ({}): {}", self.severity, self.code, id, self.message),
            None => write!(f, "[{}] {}: {}", self.severity, self.code, self.message),
        }
    }
}

/// Stable diagnostic codes.
pub mod codes {
    // Topology
    pub const UNKNOWN_EQUIPMENT: &str = "UNKNOWN_EQUIPMENT";
    pub const UNKNOWN_PORT: &str = "UNKNOWN_PORT";
    pub const PORT_DIRECTION: &str = "PORT_DIRECTION";
    pub const INCOMPATIBLE_PORTS: &str = "INCOMPATIBLE_PORTS";
    pub const PORT_ALREADY_CONNECTED: &str = "PORT_ALREADY_CONNECTED";
    pub const SELF_CONNECTION: &str = "SELF_CONNECTION";
    pub const DISCONNECTED_INLET: &str = "DISCONNECTED_INLET";
    pub const BOUNDARY_CONFLICT: &str = "BOUNDARY_CONFLICT";

    // Validation (request and config domain)
    pub const UNKNOWN_TYPE: &str = "UNKNOWN_TYPE";
    pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
    pub const INVALID_OPTION: &str = "INVALID_OPTION";
    pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";
    pub const NON_FINITE: &str = "NON_FINITE";
    pub const EXTREME_PH: &str = "EXTREME_PH";
    pub const HIGH_TURBIDITY: &str = "HIGH_TURBIDITY";
    pub const HIGH_TDS: &str = "HIGH_TDS";
    pub const TEMP_TOO_HIGH: &str = "TEMP_TOO_HIGH";

    // Convergence
    pub const CONVERGENCE_FAILED: &str = "CONVERGENCE_FAILED";
    pub const SOLVE_TIMEOUT: &str = "SOLVE_TIMEOUT";
    pub const SOLVE_CANCELLED: &str = "SOLVE_CANCELLED";
    pub const EQUIPMENT_CALC_ERROR: &str = "EQUIPMENT_CALC_ERROR";

    // Physical constraints
    pub const HIGH_FLUX: &str = "HIGH_FLUX";
    pub const RECOVERY_CEILING: &str = "RECOVERY_CEILING";
    pub const HIGH_RECOVERY: &str = "HIGH_RECOVERY";
    pub const TMP_RATING: &str = "TMP_RATING";
    pub const NEGATIVE_NET_PRESSURE: &str = "NEGATIVE_NET_PRESSURE";
    pub const MEMBRANE_TEMPERATURE: &str = "MEMBRANE_TEMPERATURE";
    pub const LOW_FEED_PRESSURE: &str = "LOW_FEED_PRESSURE";
    pub const PUMP_ENVELOPE: &str = "PUMP_ENVELOPE";
    pub const PUMP_RUNOUT: &str = "PUMP_RUNOUT";
    pub const PUMP_NEGATIVE_HEAD: &str = "PUMP_NEGATIVE_HEAD";
    pub const TANK_OVERFLOW: &str = "TANK_OVERFLOW";
    pub const TANK_DRAINED: &str = "TANK_DRAINED";
    pub const OVERFLOW_RISK: &str = "OVERFLOW_RISK";
    pub const MASS_BALANCE: &str = "MASS_BALANCE";
    pub const PORT_OVERPRESSURE: &str = "PORT_OVERPRESSURE";
    pub const HIGH_VELOCITY: &str = "HIGH_VELOCITY";
}
