// wf-core/src/units.rs
//
// Plant data arrives in bar, m³/h, °C and L/m²/h. Models convert to SI through
// these helpers so every conversion factor lives in one place.

use uom::si::f64::{
    Area as UomArea, Length as UomLength, Power as UomPower, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Velocity as UomVelocity,
    VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn m3ph(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_hour;
    VolumeRate::new::<cubic_meter_per_hour>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

/// bar → Pa.
#[inline]
pub fn bar_to_pa(v: f64) -> f64 {
    use uom::si::pressure::pascal;
    bar(v).get::<pascal>()
}

/// Pa → bar.
#[inline]
pub fn pa_to_bar(v: f64) -> f64 {
    use uom::si::pressure::bar;
    pa(v).get::<bar>()
}

/// °C → K.
#[inline]
pub fn celsius_to_kelvin(v: f64) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    celsius(v).get::<kelvin>()
}

/// Flux m/s → L/m²/h (LMH).
#[inline]
pub fn mps_to_lmh(v: f64) -> f64 {
    // 1 m/s = 1000 L/m²/s
    v * 1000.0 * 3600.0
}

/// Flux L/m²/h (LMH) → m/s.
#[inline]
pub fn lmh_to_mps(v: f64) -> f64 {
    v / (1000.0 * 3600.0)
}

/// Circular cross-section of a pipe/port of the given diameter.
#[inline]
pub fn circle_area(diameter: Length) -> Area {
    diameter * diameter * (core::f64::consts::PI / 4.0)
}

pub mod constants {
    pub const G0_MPS2: f64 = 9.806_65;

    /// Universal gas constant, J/(mol·K).
    pub const R_J_PER_MOL_K: f64 = 8.314_462_618;

    /// Atmospheric reference pressure used to seed streams, bar.
    pub const AMBIENT_PRESSURE_BAR: f64 = 1.0;

    /// Reference temperature used to seed streams, °C.
    pub const AMBIENT_TEMPERATURE_C: f64 = 25.0;
}
