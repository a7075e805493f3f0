//! Shared helpers for the equipment models.

use crate::error::{EquipmentError, EquipmentResult};
use wf_core::numeric::ensure_finite;
use wf_core::units::constants::G0_MPS2;
use wf_core::units::{Velocity, circle_area, m, m3ph};
use uom::si::velocity::meter_per_second;
use wf_graph::StreamKind;
use wf_water::density;

/// Stream kind sets used in port layouts.
pub mod kinds {
    use super::StreamKind;

    pub const RAW: &[StreamKind] = &[StreamKind::Raw];
    pub const PROCESS: &[StreamKind] = &[StreamKind::Raw, StreamKind::Permeate, StreamKind::Concentrate];
    pub const MEMBRANE_FEED: &[StreamKind] = &[StreamKind::Raw, StreamKind::Concentrate];
    pub const PERMEATE: &[StreamKind] = &[StreamKind::Permeate];
    pub const CONCENTRATE: &[StreamKind] = &[StreamKind::Concentrate];
    pub const DRAIN: &[StreamKind] = &[StreamKind::Drain];
    pub const PRODUCT: &[StreamKind] = &[StreamKind::Permeate, StreamKind::Raw];
    pub const REJECT: &[StreamKind] = &[StreamKind::Drain, StreamKind::Concentrate];
}

/// Ensure a value is finite.
pub fn check_finite(value: f64, what: &'static str) -> EquipmentResult<()> {
    ensure_finite(value, what).map_err(|_| EquipmentError::NonPhysical { what })?;
    Ok(())
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Mean velocity (m/s) of a flow (m³/h) through a round bore.
pub fn pipe_velocity(flow_m3ph: f64, diameter_m: f64) -> f64 {
    if diameter_m <= 0.0 {
        return 0.0;
    }
    let v: Velocity = m3ph(flow_m3ph) / circle_area(m(diameter_m));
    v.get::<meter_per_second>()
}

/// Pressure (bar) of a water column of `height_m` at `temperature_c`.
pub fn hydrostatic_bar(height_m: f64, temperature_c: f64) -> f64 {
    density(temperature_c) * G0_MPS2 * height_m / 1e5
}

/// Head (m) equivalent of a pressure difference (bar).
pub fn head_m(dp_bar: f64, temperature_c: f64) -> f64 {
    dp_bar * 1e5 / (density(temperature_c) * G0_MPS2)
}

/// Mass load (kg/h) of a species at `mg_per_l` in `flow_m3ph`.
pub fn load_kg_per_h(flow_m3ph: f64, mg_per_l: f64) -> f64 {
    // mg/L == g/m³
    flow_m3ph * mg_per_l / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn velocity_in_150mm_bore() {
        let v = pipe_velocity(100.0, 0.15);
        assert!((v - 1.572).abs() < 1e-3, "v = {v}");
        assert_eq!(pipe_velocity(100.0, 0.0), 0.0);
    }

    #[test]
    fn ten_metres_is_about_one_bar() {
        let p = hydrostatic_bar(10.0, 20.0);
        assert!((p - 0.981).abs() < 1e-3);
        assert!((head_m(p, 20.0) - 10.0).abs() < 1e-9);
    }
}
