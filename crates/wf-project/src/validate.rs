//! Request-level checks that need no graph: equipment types, typed
//! configs and solver options.

use std::str::FromStr;

use wf_core::{Diagnostic, Severity, codes};
use wf_equipment::{EquipmentConfig, EquipmentKind};

use crate::schema::{EquipmentDef, OptionsDef, SolveRequest};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RequestIssue {
    #[error("Unknown equipment type '{type_name}' for '{equipment}'")]
    UnknownType { equipment: String, type_name: String },

    #[error("Invalid config for '{equipment}': {message}")]
    InvalidConfig { equipment: String, message: String },

    #[error("Invalid option {option}: {reason}")]
    InvalidOption { option: &'static str, reason: String },
}

impl RequestIssue {
    pub fn code(&self) -> &'static str {
        match self {
            RequestIssue::UnknownType { .. } => codes::UNKNOWN_TYPE,
            RequestIssue::InvalidConfig { .. } => codes::INVALID_CONFIG,
            RequestIssue::InvalidOption { .. } => codes::INVALID_OPTION,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let d = Diagnostic::validation(Severity::Error, self.code(), self.to_string());
        match self {
            RequestIssue::UnknownType { equipment, .. }
            | RequestIssue::InvalidConfig { equipment, .. } => d.on(equipment.clone()),
            RequestIssue::InvalidOption { .. } => d,
        }
    }
}

/// Resolve the type and parse the config of one equipment.
///
/// A missing or `null` config means all defaults.
pub fn typed_config(id: &str, def: &EquipmentDef) -> Result<EquipmentConfig, RequestIssue> {
    let kind = EquipmentKind::from_str(&def.equipment_type).map_err(|_| RequestIssue::UnknownType {
        equipment: id.to_string(),
        type_name: def.equipment_type.clone(),
    })?;
    if def.config.is_null() {
        return Ok(EquipmentConfig::default_for(kind));
    }
    let tagged = serde_json::json!({ "type": kind.name(), "config": def.config });
    serde_json::from_value(tagged).map_err(|e| RequestIssue::InvalidConfig {
        equipment: id.to_string(),
        message: e.to_string(),
    })
}

/// Sanity of the solver overrides.
pub fn check_options(options: &OptionsDef) -> Vec<RequestIssue> {
    let mut out = Vec::new();
    let mut positive = |option: &'static str, v: Option<f64>| {
        if let Some(v) = v {
            if !(v.is_finite() && v > 0.0) {
                out.push(RequestIssue::InvalidOption {
                    option,
                    reason: format!("{} must be a positive number", v),
                });
            }
        }
    };
    positive("tolerance", options.tolerance);
    positive("balanceTolerance", options.balance_tolerance);

    if let Some(w) = options.relaxation {
        if !(w > 0.0 && w <= 1.0) {
            out.push(RequestIssue::InvalidOption {
                option: "relaxation",
                reason: format!("{} is outside (0, 1]", w),
            });
        }
    }
    if options.max_iterations == Some(0) {
        out.push(RequestIssue::InvalidOption {
            option: "maxIterations",
            reason: "at least one pass is required".to_string(),
        });
    }
    out
}

/// Every request-level problem, equipment in id order then options.
pub fn check_request(request: &SolveRequest) -> Vec<RequestIssue> {
    let mut issues: Vec<RequestIssue> = request
        .equipment
        .iter()
        .filter_map(|(id, def)| typed_config(id, def).err())
        .collect();
    issues.extend(check_options(&request.options));
    issues
}
