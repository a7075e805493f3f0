//! Per-equipment performance metrics.
//!
//! Units follow the plant convention: flows m³/h, pressures bar, power kW,
//! flux L/m²/h, resistances 1/m.

use serde::Serialize;
use wf_water::{SourceAssessment, WaterQuality};

/// Metrics of one equipment, tagged by equipment type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquipmentMetrics {
    FeedSource(FeedSourceMetrics),
    Tank(TankMetrics),
    Pump(PumpMetrics),
    Strainer(StrainerMetrics),
    Membrane(MembraneMetrics),
    Splitter(SplitterMetrics),
    Product(SinkMetrics),
    Waste(SinkMetrics),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSourceMetrics {
    pub flow_rate: f64,
    #[serde(flatten)]
    pub assessment: SourceAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TankMetrics {
    pub inflow: f64,
    pub outlet_flow: f64,
    pub overflow_flow: f64,
    /// m³/h, positive when filling.
    pub accumulation: f64,
    /// m³
    pub water_volume: f64,
    /// h
    pub residence_time: f64,
    /// h
    pub water_age: f64,
    /// %
    pub projected_level: f64,
    pub overflow_risk: bool,
    pub settling_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpMetrics {
    pub flow: f64,
    pub suction_pressure: f64,
    pub discharge_pressure: f64,
    /// m
    pub head_required: f64,
    /// m
    pub head_available: f64,
    /// m
    pub head_delivered: f64,
    pub hydraulic_power: f64,
    pub shaft_power: f64,
    pub efficiency: f64,
    /// kWh/m³
    pub specific_energy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrainerMetrics {
    pub pressure_drop: f64,
    /// m/s
    pub velocity: f64,
    pub removal_efficiency: f64,
    pub outlet_flow: f64,
    pub drain_flow: f64,
    /// kg/h of TSS
    pub solids_removed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembraneMetrics {
    pub permeate_flow: f64,
    pub concentrate_flow: f64,
    /// %
    pub recovery: f64,
    /// LMH
    pub flux: f64,
    pub transmembrane_pressure: f64,
    pub net_driving_pressure: f64,
    pub osmotic_pressure: f64,
    pub cp_factor: f64,
    pub clean_resistance: f64,
    pub fouling_resistance: f64,
    /// Pa·s
    pub viscosity: f64,
    /// kWh per m³ of permeate
    pub energy_consumption: f64,
    pub membrane_life_months: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitterMetrics {
    pub inflow: f64,
    pub outlet_flow: f64,
    pub bleed_flow: f64,
    pub split_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkMetrics {
    pub flow_rate: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub concentration: f64,
    pub quality: WaterQuality,
}

impl From<FeedSourceMetrics> for EquipmentMetrics {
    fn from(m: FeedSourceMetrics) -> Self {
        EquipmentMetrics::FeedSource(m)
    }
}

impl From<TankMetrics> for EquipmentMetrics {
    fn from(m: TankMetrics) -> Self {
        EquipmentMetrics::Tank(m)
    }
}

impl From<PumpMetrics> for EquipmentMetrics {
    fn from(m: PumpMetrics) -> Self {
        EquipmentMetrics::Pump(m)
    }
}

impl From<StrainerMetrics> for EquipmentMetrics {
    fn from(m: StrainerMetrics) -> Self {
        EquipmentMetrics::Strainer(m)
    }
}

impl From<MembraneMetrics> for EquipmentMetrics {
    fn from(m: MembraneMetrics) -> Self {
        EquipmentMetrics::Membrane(m)
    }
}

impl From<SplitterMetrics> for EquipmentMetrics {
    fn from(m: SplitterMetrics) -> Self {
        EquipmentMetrics::Splitter(m)
    }
}

impl EquipmentMetrics {
    /// Membrane recovery, if this is a membrane.
    pub fn recovery(&self) -> Option<f64> {
        match self {
            EquipmentMetrics::Membrane(m) => Some(m.recovery),
            _ => None,
        }
    }
}
