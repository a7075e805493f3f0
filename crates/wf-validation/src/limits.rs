//! Configurable engineering limits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An interval with an inclusive (or optionally exclusive) lower bound and
/// an optional inclusive upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclusive_min: bool,
}

impl Bounds {
    pub const fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
            exclusive_min: false,
        }
    }

    /// `[min, ∞)`
    pub const fn at_least(min: f64) -> Self {
        Self {
            min,
            max: None,
            exclusive_min: false,
        }
    }

    /// `(min, ∞)`
    pub const fn above(min: f64) -> Self {
        Self {
            min,
            max: None,
            exclusive_min: true,
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        let low = if self.exclusive_min { v > self.min } else { v >= self.min };
        low && self.max.is_none_or(|max| v <= max)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.exclusive_min { '(' } else { '[' };
        match self.max {
            Some(max) => write!(f, "{}{}, {}]", open, self.min, max),
            None => write!(f, "{}{}, ∞)", open, self.min),
        }
    }
}

/// Domain ranges for configuration values, advisory thresholds for source
/// water and thresholds for derived-value checks.
///
/// Every field has a default; a request may override any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationLimits {
    // Membrane
    pub membrane_tmp_bar: Bounds,
    pub membrane_area_m2: Bounds,
    pub membrane_temperature_c: Bounds,
    pub crossflow_velocity_mps: Bounds,
    pub feed_concentration_g_l: Bounds,
    pub operating_hours: Bounds,

    // Tank
    pub tank_volume_m3: Bounds,
    pub tank_level_pct: Bounds,
    pub tank_dt_h: Bounds,

    // Pump
    pub pump_discharge_bar: Bounds,
    pub pump_efficiency: Bounds,
    pub pump_shutoff_head_m: Bounds,
    pub pump_max_flow_m3ph: Bounds,

    // Strainer / splitter
    pub strainer_mesh_um: Bounds,
    pub strainer_drain_fraction: Bounds,
    pub splitter_fraction: Bounds,

    // Feed streams
    pub source_flow_m3ph: Bounds,
    pub source_temperature_c: Bounds,

    // Source-water advisories
    pub ph_advisory: Bounds,
    pub turbidity_advisory_ntu: f64,
    pub tds_advisory_mg_l: f64,
    pub temperature_advisory_c: f64,

    // Derived-value checks
    pub high_recovery_pct: f64,
    pub max_velocity_mps: f64,
    /// Balance error above which `MASS_BALANCE` is an error rather than a
    /// warning, percent.
    pub mass_balance_error_pct: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            membrane_tmp_bar: Bounds::closed(0.1, 3.0),
            membrane_area_m2: Bounds::closed(1.0, 10_000.0),
            membrane_temperature_c: Bounds::closed(5.0, 60.0),
            crossflow_velocity_mps: Bounds::closed(0.5, 5.0),
            feed_concentration_g_l: Bounds::closed(0.0, 10.0),
            operating_hours: Bounds::at_least(0.0),

            tank_volume_m3: Bounds::above(0.0),
            tank_level_pct: Bounds::closed(0.0, 100.0),
            tank_dt_h: Bounds::above(0.0),

            pump_discharge_bar: Bounds::closed(1.0, 20.0),
            pump_efficiency: Bounds::closed(0.5, 0.9),
            pump_shutoff_head_m: Bounds::above(0.0),
            pump_max_flow_m3ph: Bounds::above(0.0),

            strainer_mesh_um: Bounds::above(0.0),
            strainer_drain_fraction: Bounds::closed(0.0, 0.5),
            splitter_fraction: Bounds::closed(0.0, 1.0),

            source_flow_m3ph: Bounds::at_least(0.0),
            source_temperature_c: Bounds::closed(0.0, 100.0),

            ph_advisory: Bounds::closed(4.0, 11.0),
            turbidity_advisory_ntu: 100.0,
            tds_advisory_mg_l: 2000.0,
            temperature_advisory_c: 80.0,

            high_recovery_pct: 95.0,
            max_velocity_mps: 3.0,
            mass_balance_error_pct: 5.0,
        }
    }
}
