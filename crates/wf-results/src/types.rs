//! Response data types.

use std::collections::BTreeMap;

use serde::Serialize;
use wf_core::Diagnostic;
use wf_equipment::{EquipmentMetrics, MassBalance};
use wf_water::StreamState;

use crate::summary::DiagnosticSummary;

/// Everything a solve produces. Serializes to the camelCase response
/// contract; maps are ordered so equal solves serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub converged: bool,
    pub iterations: usize,
    /// Largest relative mass-balance discrepancy over all equipment.
    pub max_residual: f64,
    pub streams: BTreeMap<String, StreamResult>,
    pub equipment_results: BTreeMap<String, EquipmentResult>,
    /// Percent of external feed that leaves as product.
    pub system_recovery: f64,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: DiagnosticSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResult {
    pub source_equipment: String,
    pub source_port: String,
    pub target_equipment: String,
    pub target_port: String,
    pub properties: StreamState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentResult {
    #[serde(rename = "type")]
    pub equipment_type: String,
    /// Absent when the model could not be evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<EquipmentMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass_balance: Option<BalanceReport>,
}

/// Mass balance of one equipment, kg/h.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub inflow: f64,
    pub outflow: f64,
    pub accumulation: f64,
    pub external: f64,
    pub relative_error: f64,
}

impl From<MassBalance> for BalanceReport {
    fn from(b: MassBalance) -> Self {
        Self {
            inflow: b.inflow,
            outflow: b.outflow,
            accumulation: b.accumulation,
            external: b.external,
            relative_error: b.relative_error(),
        }
    }
}
