//! Stream property record and mixing.

use crate::error::{WaterError, WaterResult};
use crate::properties::density;
use crate::quality::WaterQuality;
use serde::{Deserialize, Serialize};
use wf_core::units::constants::{AMBIENT_PRESSURE_BAR, AMBIENT_TEMPERATURE_C};

/// Properties of one stream.
///
/// Plant units: flow m³/h, pressure bar (absolute), temperature °C,
/// suspended-solids concentration g/L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamState {
    pub flow_rate: f64,
    pub pressure: f64,
    pub temperature: f64,
    #[serde(default)]
    pub concentration: f64,
    #[serde(default)]
    pub quality: WaterQuality,
}

impl Default for StreamState {
    fn default() -> Self {
        Self::seed()
    }
}

impl StreamState {
    pub fn new(
        flow_rate: f64,
        pressure: f64,
        temperature: f64,
        concentration: f64,
        quality: WaterQuality,
    ) -> Self {
        Self {
            flow_rate,
            pressure,
            temperature,
            concentration,
            quality,
        }
    }

    /// Seed state every stream starts from: no flow, ambient conditions,
    /// default water quality.
    pub fn seed() -> Self {
        Self {
            flow_rate: 0.0,
            pressure: AMBIENT_PRESSURE_BAR,
            temperature: AMBIENT_TEMPERATURE_C,
            concentration: 0.0,
            quality: WaterQuality::default(),
        }
    }

    /// Same properties, different flow.
    pub fn with_flow(mut self, flow_rate: f64) -> Self {
        self.flow_rate = flow_rate;
        self
    }

    /// Same properties, different pressure.
    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    /// Mass flow in kg/h.
    pub fn mass_flow(&self) -> f64 {
        self.flow_rate * density(self.temperature)
    }

    /// Reject states that no model should ever produce.
    pub fn check_physical(&self) -> WaterResult<()> {
        let scalar = [
            ("flow rate", self.flow_rate),
            ("pressure", self.pressure),
            ("concentration", self.concentration),
        ];
        for (what, value) in scalar {
            if !value.is_finite() || value < 0.0 {
                return Err(WaterError::NonPhysical { what, value });
            }
        }
        if !self.temperature.is_finite() {
            return Err(WaterError::NonPhysical {
                what: "temperature",
                value: self.temperature,
            });
        }
        if let Some((p, value)) = self.quality.out_of_domain().into_iter().next() {
            return Err(WaterError::OutOfRange {
                what: p.name(),
                value,
            });
        }
        Ok(())
    }
}

/// Flow-weighted mix of several streams.
///
/// Flows add, temperature and concentrations blend by flow, pressure is the
/// lowest inlet pressure. Zero total flow blends with equal weights so the
/// result still carries meaningful properties.
pub fn mix(streams: &[&StreamState]) -> WaterResult<StreamState> {
    if streams.is_empty() {
        return Err(WaterError::InvalidArg {
            what: "cannot mix an empty set of streams",
        });
    }
    if streams.len() == 1 {
        return Ok(*streams[0]);
    }

    let total: f64 = streams.iter().map(|s| s.flow_rate).sum();
    let equal = 1.0 / streams.len() as f64;
    let weight = |s: &StreamState| {
        if total > 0.0 {
            s.flow_rate / total
        } else {
            equal
        }
    };

    let temperature = streams.iter().map(|s| weight(s) * s.temperature).sum();
    let concentration = streams.iter().map(|s| weight(s) * s.concentration).sum();
    let pressure = streams
        .iter()
        .map(|s| s.pressure)
        .fold(f64::INFINITY, f64::min);
    let parts: Vec<(f64, &WaterQuality)> = streams
        .iter()
        .map(|s| (weight(s), &s.quality))
        .collect();

    Ok(StreamState {
        flow_rate: total,
        pressure,
        temperature,
        concentration,
        quality: WaterQuality::blend(&parts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_ambient() {
        let s = StreamState::seed();
        assert_eq!(s.flow_rate, 0.0);
        assert_eq!(s.pressure, 1.0);
        assert_eq!(s.temperature, 25.0);
    }

    #[test]
    fn mix_conserves_mass_flow() {
        let a = StreamState::new(30.0, 1.5, 10.0, 0.2, WaterQuality::default());
        let b = StreamState::new(70.0, 1.1, 40.0, 0.0, WaterQuality::default());
        let m = mix(&[&a, &b]).unwrap();
        let err = (m.mass_flow() - (a.mass_flow() + b.mass_flow())).abs();
        assert!(err < 1e-9, "mass error {err}");
        assert_eq!(m.pressure, 1.1);
        assert!((m.concentration - 0.06).abs() < 1e-12);
    }

    #[test]
    fn mix_zero_flow_uses_equal_weights() {
        let a = StreamState::new(0.0, 1.0, 10.0, 0.0, WaterQuality::default());
        let b = StreamState::new(0.0, 1.0, 30.0, 0.0, WaterQuality::default());
        let m = mix(&[&a, &b]).unwrap();
        assert_eq!(m.flow_rate, 0.0);
        assert!((m.temperature - 20.0).abs() < 1e-12);
    }

    #[test]
    fn mix_empty_is_error() {
        assert!(mix(&[]).is_err());
    }

    #[test]
    fn check_physical_rejects_negative_flow() {
        let s = StreamState::seed().with_flow(-1.0);
        assert!(s.check_physical().is_err());
        assert!(StreamState::seed().check_physical().is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&StreamState::seed()).unwrap();
        assert!(json.contains("\"flowRate\":0.0"));
    }
}
