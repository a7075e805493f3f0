//! Pre-solve checks on equipment configuration and external feeds.
//!
//! Out-of-domain values are errors and stop the solve. Source-water
//! advisories are warnings or info and never do.

use wf_core::{Diagnostic, Severity, codes};
use wf_equipment::EquipmentConfig;
use wf_water::{Parameter, StreamState};

use crate::limits::{Bounds, ValidationLimits};

/// Collects diagnostics for one equipment or feed.
struct Checker<'a> {
    owner: &'a str,
    out: Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    fn new(owner: &'a str) -> Self {
        Self {
            owner,
            out: Vec::new(),
        }
    }

    fn push(&mut self, severity: Severity, code: &str, message: String) {
        self.out
            .push(Diagnostic::validation(severity, code, message).on(self.owner));
    }

    fn range(&mut self, field: &str, value: f64, bounds: Bounds) {
        if !value.is_finite() {
            self.push(
                Severity::Error,
                codes::NON_FINITE,
                format!("{} must be a finite number", field),
            );
        } else if !bounds.contains(value) {
            self.push(
                Severity::Error,
                codes::OUT_OF_RANGE,
                format!("{} = {} is outside {}", field, value, bounds),
            );
        }
    }

    fn optional(&mut self, field: &str, value: Option<f64>, bounds: Bounds) {
        if let Some(v) = value {
            self.range(field, v, bounds);
        }
    }
}

/// Domain checks for one equipment's configuration.
pub fn check_equipment(id: &str, config: &EquipmentConfig, limits: &ValidationLimits) -> Vec<Diagnostic> {
    let mut c = Checker::new(id);
    match config {
        EquipmentConfig::Membrane(m) => {
            c.range("transmembranePressure", m.transmembrane_pressure, limits.membrane_tmp_bar);
            c.range("membraneArea", m.membrane_area, limits.membrane_area_m2);
            c.optional("temperature", m.temperature, limits.membrane_temperature_c);
            c.range("crossflowVelocity", m.crossflow_velocity, limits.crossflow_velocity_mps);
            c.optional("feedConcentration", m.feed_concentration, limits.feed_concentration_g_l);
            c.range("operatingHours", m.operating_hours, limits.operating_hours);
            c.range("historicalFluxLmh", m.historical_flux_lmh, Bounds::at_least(0.0));
            c.range("channelPressureDrop", m.channel_pressure_drop, Bounds::at_least(0.0));
            c.range("maxFluxLmh", m.max_flux_lmh, Bounds::above(0.0));
            c.range("maxRecoveryPct", m.max_recovery_pct, Bounds { min: 0.0, max: Some(100.0), exclusive_min: true });
        }
        EquipmentConfig::Tank(t) => {
            c.range("volume", t.volume, limits.tank_volume_m3);
            c.range("level", t.level, limits.tank_level_pct);
            c.range("dtH", t.dt_h, limits.tank_dt_h);
            c.range("height", t.height, Bounds::at_least(0.0));
            c.optional("outletSetpoint", t.outlet_setpoint, Bounds::at_least(0.0));
        }
        EquipmentConfig::Pump(p) => {
            c.range("dischargePressure", p.discharge_pressure, limits.pump_discharge_bar);
            c.range("efficiency", p.efficiency, limits.pump_efficiency);
            c.range("shutoffHead", p.shutoff_head, limits.pump_shutoff_head_m);
            c.range("maxFlow", p.max_flow, limits.pump_max_flow_m3ph);
        }
        EquipmentConfig::Strainer(s) => {
            c.range("meshUm", s.mesh_um, limits.strainer_mesh_um);
            c.range("drainFraction", s.drain_fraction, limits.strainer_drain_fraction);
            c.range("diameterM", s.diameter_m, Bounds::above(0.0));
        }
        EquipmentConfig::Splitter(s) => {
            c.range("splitFraction", s.split_fraction, limits.splitter_fraction);
        }
        EquipmentConfig::FeedSource(f) => {
            check_stream_into(&mut c, &f.stream(), limits);
        }
        EquipmentConfig::Product(_) | EquipmentConfig::Waste(_) => {}
    }
    c.out
}

/// Checks for a stream entering the flowsheet: a feed source's output or
/// an external feed on an inlet port.
pub fn check_stream(owner: &str, stream: &StreamState, limits: &ValidationLimits) -> Vec<Diagnostic> {
    let mut c = Checker::new(owner);
    check_stream_into(&mut c, stream, limits);
    c.out
}

fn check_stream_into(c: &mut Checker<'_>, s: &StreamState, limits: &ValidationLimits) {
    c.range("flowRate", s.flow_rate, limits.source_flow_m3ph);
    c.range("temperature", s.temperature, limits.source_temperature_c);
    c.range("pressure", s.pressure, Bounds::at_least(0.0));
    c.range("concentration", s.concentration, Bounds::at_least(0.0));
    for p in Parameter::ALL {
        let bounds = if p == Parameter::Ph {
            Bounds::closed(0.0, 14.0)
        } else {
            Bounds::at_least(0.0)
        };
        c.range(p.name(), s.quality.get(p), bounds);
    }

    let q = &s.quality;
    if q.ph.is_finite() && !limits.ph_advisory.contains(q.ph) {
        c.push(
            Severity::Warning,
            codes::EXTREME_PH,
            format!("pH {} is outside the typical treatment range {}", q.ph, limits.ph_advisory),
        );
    }
    if q.turbidity > limits.turbidity_advisory_ntu {
        c.push(
            Severity::Warning,
            codes::HIGH_TURBIDITY,
            format!("Turbidity {} NTU is very high; extensive pretreatment required", q.turbidity),
        );
    }
    if q.tds > limits.tds_advisory_mg_l {
        c.push(
            Severity::Info,
            codes::HIGH_TDS,
            format!("TDS {} mg/L may require reverse osmosis", q.tds),
        );
    }
    if s.temperature > limits.temperature_advisory_c {
        c.push(
            Severity::Warning,
            codes::TEMP_TOO_HIGH,
            format!("Temperature {} °C may damage equipment", s.temperature),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_equipment::{EquipmentKind, FeedSourceConfig, MembraneConfig, PumpConfig};

    fn codes_of(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn defaults_are_in_domain() {
        let limits = ValidationLimits::default();
        for kind in EquipmentKind::ALL {
            let d = check_equipment("X", &EquipmentConfig::default_for(kind), &limits);
            assert!(d.is_empty(), "{kind}: {d:?}");
        }
    }

    #[test]
    fn membrane_tmp_out_of_range() {
        let cfg = EquipmentConfig::Membrane(MembraneConfig {
            transmembrane_pressure: 3.5,
            ..MembraneConfig::default()
        });
        let d = check_equipment("UF-1", &cfg, &ValidationLimits::default());
        assert_eq!(codes_of(&d), vec![codes::OUT_OF_RANGE]);
        assert!(d[0].is_blocking());
        assert_eq!(d[0].equipment_id.as_deref(), Some("UF-1"));
        assert!(d[0].message.contains("transmembranePressure"));
    }

    #[test]
    fn non_finite_reported_separately() {
        let cfg = EquipmentConfig::Pump(PumpConfig {
            efficiency: f64::NAN,
            ..PumpConfig::default()
        });
        let d = check_equipment("P1", &cfg, &ValidationLimits::default());
        assert_eq!(codes_of(&d), vec![codes::NON_FINITE]);
    }

    #[test]
    fn source_advisories_do_not_block() {
        let mut cfg = FeedSourceConfig::default();
        cfg.water_quality.ph = 3.0;
        cfg.water_quality.turbidity = 150.0;
        cfg.water_quality.tds = 2500.0;
        cfg.temperature = 85.0;
        let d = check_equipment("F", &EquipmentConfig::FeedSource(cfg), &ValidationLimits::default());
        assert_eq!(
            codes_of(&d),
            vec![codes::EXTREME_PH, codes::HIGH_TURBIDITY, codes::HIGH_TDS, codes::TEMP_TOO_HIGH]
        );
        assert!(d.iter().all(|x| !x.is_blocking()));
        assert_eq!(d[2].severity, Severity::Info);
    }

    #[test]
    fn negative_quality_blocks() {
        let mut s = StreamState::seed().with_flow(10.0);
        s.quality.iron = -1.0;
        s.quality.ph = 15.0;
        let d = check_stream("M1.feed", &s, &ValidationLimits::default());
        let blocking: Vec<_> = d.iter().filter(|x| x.is_blocking()).collect();
        assert_eq!(blocking.len(), 2);
        assert!(d.iter().any(|x| x.code == codes::EXTREME_PH));
    }
}
