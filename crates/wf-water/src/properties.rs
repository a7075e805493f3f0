//! Pure-water property correlations.
//!
//! Valid for liquid water in the range treatment plants operate in
//! (roughly 0–100 °C). Dissolved solids are ignored.

/// Water density at `temperature_c` (°C), kg/m³.
///
/// Linear in temperature, which keeps flow-weighted temperature mixing
/// exactly mass conserving.
pub fn density(temperature_c: f64) -> f64 {
    1000.0 * (1.0 - 0.0002 * (temperature_c - 20.0))
}

/// Water dynamic viscosity at `temperature_c` (°C), Pa·s.
pub fn viscosity(temperature_c: f64) -> f64 {
    0.001 * (1.3272 * (20.0 - temperature_c) / (temperature_c + 105.0)).exp()
}

/// Reynolds number for pipe flow.
pub fn reynolds_number(velocity_mps: f64, diameter_m: f64, temperature_c: f64) -> f64 {
    density(temperature_c) * velocity_mps * diameter_m / viscosity(temperature_c)
}
