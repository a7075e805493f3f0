use std::path::{Path, PathBuf};
use std::time::Duration;

use proptest::prelude::*;
use serde_json::json;
use wf_core::codes;
use wf_core::numeric::{Tolerances, nearly_equal};
use wf_equipment::metrics::EquipmentMetrics;
use wf_project::SolveRequest;
use wf_results::SolveResult;
use wf_solver::{CancelToken, SolveOptions, solve, solve_batch, solve_batch_with, solve_with};
use wf_validation::Bounds;

fn demo(name: &str) -> SolveRequest {
    let path: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name);
    wf_project::load(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e))
}

fn request(value: serde_json::Value) -> SolveRequest {
    serde_json::from_value(value).unwrap()
}

fn has_code(r: &SolveResult, code: &str) -> bool {
    r.diagnostics.iter().any(|d| d.code == code)
}

/// Worst relative imbalance over equipment with both inbound and outbound
/// streams, summed from the published streams alone. Only meaningful for
/// flowsheets without storage or open outlets.
fn stream_closure(r: &SolveResult) -> f64 {
    let mut worst: f64 = 0.0;
    for id in r.equipment_results.keys() {
        let (mut inflow, mut outflow) = (0.0, 0.0);
        for s in r.streams.values() {
            if s.target_equipment == *id {
                inflow += s.properties.flow_rate;
            }
            if s.source_equipment == *id {
                outflow += s.properties.flow_rate;
            }
        }
        if inflow > 0.0 && outflow > 0.0 {
            worst = worst.max((inflow - outflow).abs() / f64::max(inflow, outflow));
        }
    }
    worst
}

fn assert_balanced(r: &SolveResult, tol: f64) {
    let closure = stream_closure(r);
    assert!(closure <= tol, "published streams close to {closure}");
    for (id, eq) in &r.equipment_results {
        let b = eq.mass_balance.unwrap_or_else(|| panic!("{id} was not evaluated"));
        assert!(b.relative_error <= tol, "{id}: {b:?}");
    }
    assert!(r.max_residual <= tol);
}

fn recycle(split: f64) -> SolveRequest {
    request(json!({
        "equipment": {
            "FEED": { "type": "feed_source",
                      "config": { "flowRate": 100.0, "pressure": 1.2, "concentration": 0.1 } },
            "TK": { "type": "tank" },
            "P1": { "type": "pump" },
            "UF": { "type": "membrane",
                    "config": { "membraneArea": 500.0, "transmembranePressure": 1.5 } },
            "SPL": { "type": "splitter", "config": { "splitFraction": split } },
            "PRODUCT": { "type": "product" },
            "BLEED": { "type": "waste" }
        },
        "connections": {
            "S1": { "sourceEquipment": "FEED", "sourcePort": "outlet",
                    "targetEquipment": "TK", "targetPort": "inlet" },
            "S2": { "sourceEquipment": "TK", "sourcePort": "outlet",
                    "targetEquipment": "P1", "targetPort": "suction" },
            "S3": { "sourceEquipment": "P1", "sourcePort": "discharge",
                    "targetEquipment": "UF", "targetPort": "feed" },
            "S4": { "sourceEquipment": "UF", "sourcePort": "permeate",
                    "targetEquipment": "PRODUCT", "targetPort": "inlet" },
            "S5": { "sourceEquipment": "UF", "sourcePort": "concentrate",
                    "targetEquipment": "SPL", "targetPort": "inlet" },
            "S6": { "sourceEquipment": "SPL", "sourcePort": "outlet",
                    "targetEquipment": "TK", "targetPort": "return" },
            "S7": { "sourceEquipment": "SPL", "sourcePort": "bleed",
                    "targetEquipment": "BLEED", "targetPort": "inlet" }
        }
    }))
}

/// Feed minus permeate and bleed. Each of the four loop members may be off
/// by the balance tolerance of the loop flow, so the bound scales with it.
fn loop_leak(r: &SolveResult) -> (f64, f64) {
    let product = r.streams["S4"].properties.flow_rate;
    let bleed = r.streams["S7"].properties.flow_rate;
    let loop_flow = r.streams["S2"].properties.flow_rate;
    ((100.0 - product - bleed).abs(), 4.0 * 1e-3 * loop_flow)
}

#[test]
fn single_membrane_example() {
    let r = solve(&demo("single_membrane.json"));
    assert!(r.converged, "{:?}", r.diagnostics);
    assert_eq!(r.iterations, 1);
    assert!(!r.summary.blocking, "{:?}", r.diagnostics);
    assert_balanced(&r, 1e-3);

    let Some(EquipmentMetrics::Membrane(m)) = r.equipment_results["UF"].metrics.as_ref() else {
        panic!("UF has no membrane metrics");
    };
    assert!(m.flux > 0.0 && m.flux < 120.0, "flux {}", m.flux);
    assert!(m.recovery > 0.0 && m.recovery < 98.0, "recovery {}", m.recovery);
    assert!(nearly_equal(r.system_recovery, m.recovery, Tolerances::default()));

    let s2 = r.streams["S2"].properties.flow_rate;
    let s3 = r.streams["S3"].properties.flow_rate;
    assert!((s2 + s3 - 100.0).abs() < 1e-9);
}

#[test]
fn repeated_solves_are_identical() {
    for name in ["single_membrane.json", "recycle_loop.yaml"] {
        let req = demo(name);
        let a = serde_json::to_string(&solve(&req)).unwrap();
        let b = serde_json::to_string(&solve(&req)).unwrap();
        assert_eq!(a, b, "{name}");
    }
}

#[test]
fn disconnected_inlet_rejects_without_streams() {
    let r = solve(&request(json!({
        "equipment": {
            "P1": { "type": "pump" },
            "OUT": { "type": "product" }
        },
        "connections": {
            "S1": { "sourceEquipment": "P1", "sourcePort": "discharge",
                    "targetEquipment": "OUT", "targetPort": "inlet" }
        }
    })));
    assert!(!r.converged);
    assert!(r.streams.is_empty());
    assert!(r.equipment_results.is_empty());
    let d = r
        .diagnostics
        .iter()
        .find(|d| d.code == codes::DISCONNECTED_INLET)
        .expect("disconnected inlet reported");
    assert_eq!(d.class, wf_core::DiagnosticClass::Topology);
    assert_eq!(d.equipment_id.as_deref(), Some("P1"));
}

#[test]
fn recycle_loop_converges() {
    let r = solve(&demo("recycle_loop.yaml"));
    assert!(r.converged, "{:?}", r.diagnostics);
    assert!(r.iterations > 1);
    assert!(!has_code(&r, codes::CONVERGENCE_FAILED));
    assert_balanced(&r, 1e-3);

    assert!(r.iterations <= SolveOptions::default().max_iterations);

    // Feed in equals permeate plus bleed out once the loop has settled.
    let (leak, bound) = loop_leak(&r);
    assert!(leak <= bound, "{leak} > {bound}");
    assert!(r.streams["S6"].properties.flow_rate > 0.0);
}

#[test]
fn loop_imbalance_blocks_convergence() {
    // A loop stopped early leaves the published streams unbalanced.
    let mut req = demo("recycle_loop.yaml");
    req.options.max_iterations = Some(3);
    let r = solve(&req);
    assert!(!r.converged);
    assert!(stream_closure(&r) > 1e-3);
    assert!(r.max_residual > 1e-3);
    assert!(has_code(&r, codes::MASS_BALANCE));
}

#[test]
fn recycle_loop_with_one_pass_does_not_converge() {
    let mut req = demo("recycle_loop.yaml");
    req.options.max_iterations = Some(1);
    let r = solve(&req);
    assert!(!r.converged);
    assert_eq!(r.iterations, 1);
    assert!(has_code(&r, codes::CONVERGENCE_FAILED));
    // Partial results are still reported.
    assert_eq!(r.streams.len(), 7);
}

#[test]
fn pretreatment_train_solves() {
    let r = solve(&demo("pretreatment_train.yaml"));
    assert!(r.converged, "{:?}", r.diagnostics);
    assert!(!r.summary.blocking, "{:?}", r.diagnostics);
    assert_balanced(&r, 1e-3);
    assert!(r.system_recovery > 0.0 && r.system_recovery < 100.0);

    let sludge = r.streams["S3"].properties;
    let strained = r.streams["S2"].properties;
    assert!(sludge.quality.tss > strained.quality.tss);
}

#[test]
fn boundary_feed_counts_toward_recovery() {
    let r = solve(&request(json!({
        "equipment": { "UF": { "type": "membrane", "config": { "membraneArea": 500 } } },
        "boundaries": [ { "equipment": "UF", "port": "feed",
                          "stream": { "flowRate": 100, "pressure": 2.5, "concentration": 0.1 } } ]
    })));
    assert!(r.converged, "{:?}", r.diagnostics);
    let recovery = r.equipment_results["UF"]
        .metrics
        .as_ref()
        .and_then(|m| m.recovery())
        .unwrap();
    assert!(nearly_equal(r.system_recovery, recovery, Tolerances::default()));
}

#[test]
fn timeout_returns_partial_result() {
    let req = demo("pretreatment_train.yaml");
    let opts = SolveOptions {
        timeout: Some(Duration::ZERO),
        ..SolveOptions::default()
    };
    let r = solve_with(&req, &opts);
    assert!(!r.converged);
    assert!(has_code(&r, codes::SOLVE_TIMEOUT));
}

#[test]
fn cancellation_is_honoured() {
    let token = CancelToken::new();
    token.cancel();
    let opts = SolveOptions::default().with_cancel(token);
    let r = solve_with(&demo("recycle_loop.yaml"), &opts);
    assert!(!r.converged);
    assert!(has_code(&r, codes::SOLVE_CANCELLED));
    assert!(!r.summary.blocking);
}

#[test]
fn calculation_error_is_reported_per_equipment() {
    let req = request(json!({
        "equipment": {
            "FEED": { "type": "feed_source" },
            "TK": { "type": "tank", "config": { "volume": 0.0 } },
            "OUT": { "type": "product" }
        },
        "connections": {
            "S1": { "sourceEquipment": "FEED", "sourcePort": "outlet",
                    "targetEquipment": "TK", "targetPort": "inlet" },
            "S2": { "sourceEquipment": "TK", "sourcePort": "outlet",
                    "targetEquipment": "OUT", "targetPort": "inlet" }
        }
    }));
    // Rejected by the default limits...
    assert!(solve(&req).summary.blocking);
    assert!(solve(&req).streams.is_empty());

    // ...and a calculation error once the limit is relaxed.
    let mut opts = SolveOptions::default();
    opts.limits.tank_volume_m3 = Bounds::at_least(0.0);
    let r = solve_with(&req, &opts);
    assert!(!r.converged);
    let d = r
        .diagnostics
        .iter()
        .find(|d| d.code == codes::EQUIPMENT_CALC_ERROR)
        .expect("calculation error reported");
    assert_eq!(d.equipment_id.as_deref(), Some("TK"));
    assert!(r.equipment_results["TK"].metrics.is_none());
}

#[test]
fn out_of_range_options_reject_in_solve_with() {
    let req = demo("recycle_loop.yaml");
    for opts in [
        SolveOptions {
            relaxation: 1.95,
            ..SolveOptions::default()
        },
        SolveOptions {
            max_iterations: 0,
            ..SolveOptions::default()
        },
    ] {
        let r = solve_with(&req, &opts);
        assert!(!r.converged);
        assert_eq!(r.iterations, 0);
        assert!(r.summary.blocking);
        assert!(has_code(&r, codes::INVALID_OPTION), "{:?}", r.diagnostics);
        assert!(r.streams.is_empty());
    }
}

#[test]
fn batch_checks_resolved_options() {
    let requests = vec![demo("single_membrane.json"), demo("recycle_loop.yaml")];
    let batch = solve_batch_with(&requests, |_| SolveOptions {
        relaxation: 1.95,
        ..SolveOptions::default()
    });
    assert_eq!(batch.len(), 2);
    for r in &batch {
        assert!(has_code(r, codes::INVALID_OPTION));
        assert!(r.streams.is_empty());
    }
}

#[test]
fn batch_matches_individual_solves() {
    let requests: Vec<SolveRequest> = ["single_membrane.json", "pretreatment_train.yaml", "recycle_loop.yaml"]
        .into_iter()
        .map(demo)
        .collect();
    let batch = solve_batch(&requests);
    assert_eq!(batch.len(), 3);
    for (req, got) in requests.iter().zip(&batch) {
        assert_eq!(&solve(req), got);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn membrane_skid_conserves_mass(flow in 10.0f64..400.0, area in 50.0f64..2000.0, tmp in 0.3f64..1.8) {
        let r = solve(&request(json!({
            "equipment": {
                "FEED": { "type": "feed_source", "config": { "flowRate": flow, "pressure": 2.5 } },
                "UF": { "type": "membrane",
                        "config": { "membraneArea": area, "transmembranePressure": tmp } },
                "OUT": { "type": "product" },
                "DRAIN": { "type": "waste" }
            },
            "connections": {
                "S1": { "sourceEquipment": "FEED", "sourcePort": "outlet",
                        "targetEquipment": "UF", "targetPort": "feed" },
                "S2": { "sourceEquipment": "UF", "sourcePort": "permeate",
                        "targetEquipment": "OUT", "targetPort": "inlet" },
                "S3": { "sourceEquipment": "UF", "sourcePort": "concentrate",
                        "targetEquipment": "DRAIN", "targetPort": "inlet" }
            }
        })));
        prop_assert!(r.converged);
        prop_assert_eq!(r.iterations, 1);
        let out = r.streams["S2"].properties.flow_rate + r.streams["S3"].properties.flow_rate;
        prop_assert!((out - flow).abs() <= 1e-9 * flow);
        prop_assert!(r.max_residual <= 1e-3);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn recycle_settles_within_default_budget(split in 0.15f64..0.9) {
        let r = solve(&recycle(split));
        prop_assert!(r.converged, "{:?}", r.diagnostics);
        prop_assert!(r.iterations <= SolveOptions::default().max_iterations);
        prop_assert!(r.max_residual <= 1e-3);
        prop_assert!(stream_closure(&r) <= 1e-3);
        let (leak, bound) = loop_leak(&r);
        prop_assert!(leak <= bound, "{} > {}", leak, bound);
    }
}
