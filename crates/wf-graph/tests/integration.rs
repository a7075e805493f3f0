//! Integration tests for wf-graph.

use wf_core::{DiagnosticClass, codes};
use wf_graph::{EvalBlock, GraphBuilder, GraphError, PortDirection, PortSpec, StreamKind};

const RAW: &[StreamKind] = &[StreamKind::Raw];
const FEED: &[StreamKind] = &[StreamKind::Raw, StreamKind::Concentrate];
const PERMEATE: &[StreamKind] = &[StreamKind::Permeate];
const CONCENTRATE: &[StreamKind] = &[StreamKind::Concentrate];
const PRODUCT: &[StreamKind] = &[StreamKind::Permeate, StreamKind::Raw];
const REJECT: &[StreamKind] = &[StreamKind::Drain, StreamKind::Concentrate];

const SOURCE: &[PortSpec] = &[PortSpec::outlet("outlet", RAW)];
const MEMBRANE: &[PortSpec] = &[
    PortSpec::inlet("feed", FEED),
    PortSpec::outlet("permeate", PERMEATE),
    PortSpec::outlet("concentrate", CONCENTRATE),
];
const PRODUCT_SINK: &[PortSpec] = &[PortSpec::inlet("inlet", PRODUCT)];
const WASTE_SINK: &[PortSpec] = &[PortSpec::inlet("inlet", REJECT)];

fn membrane_line() -> GraphBuilder {
    let mut b = GraphBuilder::new();
    b.add_equipment("FEED", "feed_source", SOURCE).unwrap();
    b.add_equipment("UF-1", "membrane", MEMBRANE).unwrap();
    b.add_equipment("PRODUCT", "product", PRODUCT_SINK).unwrap();
    b.add_equipment("WASTE", "waste", WASTE_SINK).unwrap();
    b
}

#[test]
fn membrane_line_queries() {
    let mut b = membrane_line();
    b.connect("S1", "FEED", "outlet", "UF-1", "feed").unwrap();
    b.connect("S2", "UF-1", "permeate", "PRODUCT", "inlet").unwrap();
    b.connect("S3", "UF-1", "concentrate", "WASTE", "inlet").unwrap();
    let g = b.build().unwrap();

    let uf = g.find_equipment("UF-1").unwrap();
    let feed = g.find_equipment("FEED").unwrap();
    let product = g.find_equipment("PRODUCT").unwrap();
    let waste = g.find_equipment("WASTE").unwrap();

    assert_eq!(g.predecessors(uf), vec![feed]);
    assert_eq!(g.successors(uf), vec![product, waste]);
    assert_eq!(g.inlet_streams(uf), vec![g.find_stream("S1").unwrap()]);
    assert_eq!(
        g.outlet_streams(uf),
        vec![g.find_stream("S2").unwrap(), g.find_stream("S3").unwrap()]
    );

    let outlets = g.ports_of(uf, PortDirection::Outlet);
    assert_eq!(outlets.len(), 2);
    assert_eq!(outlets[0].name(), "permeate");
    assert_eq!(g.port_by_name(uf, "feed").unwrap().direction(), PortDirection::Inlet);

    let plan = g.evaluation_plan();
    assert_eq!(plan.len(), 4);
    assert_eq!(plan.blocks[0], EvalBlock::Single(feed));
    assert_eq!(plan.blocks[1], EvalBlock::Single(uf));
}

#[test]
fn permeate_cannot_feed_waste() {
    let mut b = membrane_line();
    let err = b
        .connect("S3", "UF-1", "permeate", "WASTE", "inlet")
        .unwrap_err();
    assert_eq!(err.code(), codes::INCOMPATIBLE_PORTS);
}

#[test]
fn disconnected_membrane_feed_is_topology_error() {
    let mut b = membrane_line();
    b.connect("S2", "UF-1", "permeate", "PRODUCT", "inlet").unwrap();
    b.connect("S3", "UF-1", "concentrate", "WASTE", "inlet").unwrap();

    let errs = b.build().unwrap_err();
    assert_eq!(errs.len(), 1);
    let d = errs[0].to_diagnostic();
    assert_eq!(d.class, DiagnosticClass::Topology);
    assert_eq!(d.code, codes::DISCONNECTED_INLET);
    assert_eq!(d.equipment_id.as_deref(), Some("UF-1"));
}

#[test]
fn unconnected_outlets_are_allowed() {
    let mut b = membrane_line();
    b.mark_boundary("UF-1", "feed").unwrap();
    b.mark_boundary("PRODUCT", "inlet").unwrap();
    b.mark_boundary("WASTE", "inlet").unwrap();
    let g = b.build().unwrap();
    assert_eq!(g.boundary_ports().count(), 3);
    assert!(g.streams().is_empty());
}

#[test]
fn errors_name_both_ends() {
    let mut b = membrane_line();
    b.connect("S1", "FEED", "outlet", "UF-1", "feed").unwrap();
    let err = b.connect("S1", "FEED", "outlet", "UF-1", "feed").unwrap_err();
    assert_eq!(err, GraphError::DuplicateStream { stream: "S1".into() });
    assert!(err.to_string().contains("S1"));
}
