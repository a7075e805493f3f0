use wf_core::{DiagnosticClass, Severity, codes};
use wf_equipment::EquipmentConfig;
use wf_validation::{ValidationLimits, check_equipment};

fn parse(json: &str) -> EquipmentConfig {
    serde_json::from_str(json).unwrap()
}

#[test]
fn json_config_out_of_range_is_blocking() {
    let cfg = parse(r#"{"type":"ultrafiltration","config":{"transmembranePressure":5.0}}"#);
    let d = check_equipment("UF-1", &cfg, &ValidationLimits::default());
    assert_eq!(d.len(), 1, "{d:?}");
    assert_eq!(d[0].code, codes::OUT_OF_RANGE);
    assert_eq!(d[0].class, DiagnosticClass::Validation);
    assert!(d[0].is_blocking());
    assert_eq!(d[0].equipment_id.as_deref(), Some("UF-1"));
}

#[test]
fn overridden_limits_are_respected() {
    let cfg = parse(r#"{"type":"pump","config":{"dischargePressure":25.0}}"#);
    let defaults = ValidationLimits::default();
    assert!(!check_equipment("P-1", &cfg, &defaults).is_empty());

    let mut wide = defaults.clone();
    wide.pump_discharge_bar.max = Some(30.0);
    assert!(check_equipment("P-1", &cfg, &wide).is_empty());
}

#[test]
fn limits_deserialize_partially() {
    let limits: ValidationLimits =
        serde_json::from_str(r#"{"highRecoveryPct": 90.0}"#).unwrap();
    assert_eq!(limits.high_recovery_pct, 90.0);
    assert_eq!(limits.max_velocity_mps, ValidationLimits::default().max_velocity_mps);
}

#[test]
fn advisories_never_block() {
    let cfg = parse(
        r#"{"type":"feed_source","config":{"waterQuality":{"ph":3.0,"turbidity":250.0,"tds":4000.0}}}"#,
    );
    let d = check_equipment("FEED", &cfg, &ValidationLimits::default());
    assert!(!d.is_empty());
    assert!(d.iter().all(|x| x.severity <= Severity::Warning), "{d:?}");
}
