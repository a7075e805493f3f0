//! Solve-request schema.
//!
//! Field names are camelCase on the wire. Everything except equipment
//! `type` has a default, so small requests stay small.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wf_core::units::constants::{AMBIENT_PRESSURE_BAR, AMBIENT_TEMPERATURE_C};
use wf_validation::ValidationLimits;
use wf_water::{StreamState, WaterQuality};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub equipment: BTreeMap<String, EquipmentDef>,
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boundaries: Vec<BoundaryDef>,
    #[serde(default)]
    pub options: OptionsDef,
}

/// `{type, config}`; the config stays untyped until the request is
/// compiled so one bad equipment does not hide problems in the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDef {
    #[serde(rename = "type")]
    pub equipment_type: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

impl EquipmentDef {
    pub fn new(equipment_type: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            equipment_type: equipment_type.into(),
            config,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDef {
    pub source_equipment: String,
    pub source_port: String,
    pub target_equipment: String,
    pub target_port: String,
}

/// External feed on an inlet port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryDef {
    pub equipment: String,
    pub port: String,
    #[serde(default)]
    pub stream: BoundaryStream,
}

/// Stream properties of an external feed; unspecified values are ambient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundaryStream {
    /// m³/h
    pub flow_rate: f64,
    /// bar
    pub pressure: f64,
    /// °C
    pub temperature: f64,
    /// g/L
    pub concentration: f64,
    pub quality: WaterQuality,
}

impl Default for BoundaryStream {
    fn default() -> Self {
        Self {
            flow_rate: 0.0,
            pressure: AMBIENT_PRESSURE_BAR,
            temperature: AMBIENT_TEMPERATURE_C,
            concentration: 0.0,
            quality: WaterQuality::default(),
        }
    }
}

impl From<BoundaryStream> for StreamState {
    fn from(b: BoundaryStream) -> Self {
        StreamState::new(b.flow_rate, b.pressure, b.temperature, b.concentration, b.quality)
    }
}

/// Per-request solver overrides. Unset values fall back to the solver's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relaxation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_tolerance: Option<f64>,
    /// Wall-clock budget, milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ValidationLimits>,
}
