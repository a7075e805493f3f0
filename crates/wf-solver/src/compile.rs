//! Compile a request into an immutable flowsheet.
//!
//! Every problem is collected before giving up, so one pass over a broken
//! request reports all of it.

use std::collections::BTreeSet;
use std::str::FromStr;

use wf_core::{Diagnostic, EquipId};
use wf_equipment::{EquipmentConfig, EquipmentKind, PortStreams};
use wf_graph::{FlowsheetGraph, GraphBuilder, GraphError};
use wf_project::{SolveRequest, typed_config};
use wf_validation::{check_equipment, check_stream};
use wf_water::StreamState;

use crate::options::SolveOptions;

/// A validated request, ready to evaluate.
#[derive(Debug, Clone)]
pub struct Flowsheet {
    pub graph: FlowsheetGraph,
    /// By equipment id.
    pub configs: Vec<EquipmentConfig>,
    /// External feeds, by equipment id.
    pub boundaries: Vec<PortStreams>,
}

/// Outcome of compiling a request.
#[derive(Debug)]
pub enum Compiled {
    /// Ready to solve; carries the non-blocking findings (advisories).
    Ready(Flowsheet, Vec<Diagnostic>),
    /// At least one validation or topology error.
    Rejected(Vec<Diagnostic>),
}

/// Check and type a request against fully resolved `options`.
///
/// The options themselves are checked here, whatever their origin; the
/// request's own `options` block only matters through them.
pub fn compile(request: &SolveRequest, options: &SolveOptions) -> Compiled {
    let limits = &options.limits;
    let mut diagnostics: Vec<Diagnostic> = options
        .check()
        .iter()
        .map(|i| i.to_diagnostic())
        .collect();

    // Typed configs and their domain checks.
    let mut typed: Vec<(&str, Option<EquipmentConfig>, Option<EquipmentKind>)> = Vec::new();
    for (id, def) in &request.equipment {
        match typed_config(id, def) {
            Ok(cfg) => {
                diagnostics.extend(check_equipment(id, &cfg, limits));
                let kind = cfg.kind();
                typed.push((id.as_str(), Some(cfg), Some(kind)));
            }
            Err(issue) => {
                diagnostics.push(issue.to_diagnostic());
                // Keep the ports if the type is known, so topology is still checked.
                let kind = EquipmentKind::from_str(&def.equipment_type).ok();
                typed.push((id.as_str(), None, kind));
            }
        }
    }

    let mut graph_errors = Vec::new();
    let mut builder = GraphBuilder::new();
    for (id, _, kind) in &typed {
        if let Some(kind) = kind {
            if let Err(e) = builder.add_equipment(*id, kind.name(), kind.ports()) {
                graph_errors.push(e);
            }
        }
    }
    for (name, c) in &request.connections {
        if let Err(e) = builder.connect(
            name,
            &c.source_equipment,
            &c.source_port,
            &c.target_equipment,
            &c.target_port,
        ) {
            graph_errors.push(e);
        }
    }

    let mut seen = BTreeSet::new();
    let mut feeds = Vec::new();
    for b in &request.boundaries {
        if !seen.insert((b.equipment.as_str(), b.port.as_str())) {
            graph_errors.push(GraphError::BoundaryConflict {
                equipment: b.equipment.clone(),
                port: b.port.clone(),
                reason: "external feed declared twice",
            });
            continue;
        }
        let state = StreamState::from(b.stream);
        diagnostics.extend(check_stream(&b.equipment, &state, limits));
        match builder.mark_boundary(&b.equipment, &b.port) {
            Ok(pid) => feeds.push((pid, state)),
            Err(e) => graph_errors.push(e),
        }
    }

    let graph = match builder.build() {
        Ok(graph) if graph_errors.is_empty() => Some(graph),
        Ok(_) => None,
        Err(errors) => {
            graph_errors.extend(errors);
            None
        }
    };
    diagnostics.extend(graph_errors.iter().map(GraphError::to_diagnostic));

    let blocking = diagnostics.iter().any(Diagnostic::is_blocking);
    let Some(graph) = graph.filter(|_| !blocking) else {
        return Compiled::Rejected(diagnostics);
    };

    // Every equipment is in the graph and typed at this point.
    let configs: Vec<EquipmentConfig> = typed.into_iter().filter_map(|(_, cfg, _)| cfg).collect();
    let mut boundaries = vec![PortStreams::new(); graph.equipment().len()];
    for (pid, state) in feeds {
        if let Some(port) = graph.port(pid) {
            boundaries[port.equipment.idx()].insert(port.name(), state);
        }
    }

    Compiled::Ready(
        Flowsheet {
            graph,
            configs,
            boundaries,
        },
        diagnostics,
    )
}

impl Flowsheet {
    pub fn config(&self, id: EquipId) -> Option<&EquipmentConfig> {
        self.configs.get(id.idx())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::codes;
    use wf_project::from_json_str;

    fn rejected(json: &str) -> Vec<Diagnostic> {
        let request = from_json_str(json).unwrap();
        match compile(&request, &SolveOptions::from_request(&request.options)) {
            Compiled::Rejected(d) => d,
            Compiled::Ready(..) => panic!("expected rejection"),
        }
    }

    #[test]
    fn compiles_boundary_fed_membrane() {
        let request = from_json_str(
            r#"{ "equipment": { "UF": { "type": "membrane" } },
                 "boundaries": [ { "equipment": "UF", "port": "feed",
                                   "stream": { "flowRate": 50, "pressure": 2.5 } } ] }"#,
        )
        .unwrap();
        let Compiled::Ready(fs, advisories) = compile(&request, &SolveOptions::default()) else {
            panic!("expected a flowsheet");
        };
        assert!(advisories.is_empty(), "{advisories:?}");
        assert_eq!(fs.configs.len(), 1);
        assert_eq!(fs.boundaries[0].get("feed").map(|s| s.flow_rate), Some(50.0));
    }

    #[test]
    fn collects_every_problem() {
        let d = rejected(
            r#"{ "equipment": {
                    "P1": { "type": "pump", "config": { "efficiency": 0.2 } },
                    "X":  { "type": "reactor" } },
                 "connections": {
                    "S1": { "sourceEquipment": "P1", "sourcePort": "discharge",
                            "targetEquipment": "GHOST", "targetPort": "inlet" } } }"#,
        );
        let codes_found: Vec<&str> = d.iter().map(|x| x.code.as_str()).collect();
        assert!(codes_found.contains(&codes::OUT_OF_RANGE), "{codes_found:?}");
        assert!(codes_found.contains(&codes::UNKNOWN_TYPE), "{codes_found:?}");
        assert!(codes_found.contains(&codes::UNKNOWN_EQUIPMENT), "{codes_found:?}");
        // The pump's suction has no producer.
        assert!(codes_found.contains(&codes::DISCONNECTED_INLET), "{codes_found:?}");
    }

    #[test]
    fn request_options_are_checked() {
        let d = rejected(
            r#"{ "equipment": { "UF": { "type": "membrane" } },
                 "boundaries": [ { "equipment": "UF", "port": "feed" } ],
                 "options": { "relaxation": 1.5 } }"#,
        );
        let invalid: Vec<_> = d.iter().filter(|x| x.code == codes::INVALID_OPTION).collect();
        assert_eq!(invalid.len(), 1, "{d:?}");
        assert!(invalid[0].message.contains("relaxation"));
    }

    #[test]
    fn resolved_options_are_checked() {
        let request = from_json_str(
            r#"{ "equipment": { "UF": { "type": "membrane" } },
                 "boundaries": [ { "equipment": "UF", "port": "feed" } ] }"#,
        )
        .unwrap();
        let options = SolveOptions {
            max_iterations: 0,
            tolerance: f64::NAN,
            ..SolveOptions::default()
        };
        let Compiled::Rejected(d) = compile(&request, &options) else {
            panic!("expected rejection");
        };
        assert_eq!(d.iter().filter(|x| x.code == codes::INVALID_OPTION).count(), 2, "{d:?}");
    }

    #[test]
    fn duplicate_boundary_conflicts() {
        let d = rejected(
            r#"{ "equipment": { "UF": { "type": "membrane" } },
                 "boundaries": [ { "equipment": "UF", "port": "feed" },
                                 { "equipment": "UF", "port": "feed" } ] }"#,
        );
        assert!(d.iter().any(|x| x.code == codes::BOUNDARY_CONFLICT));
    }

    #[test]
    fn advisories_do_not_block() {
        let request = from_json_str(
            r#"{ "equipment": {
                    "FEED": { "type": "feed_source", "config": { "waterQuality": { "tds": 5000 } } },
                    "OUT":  { "type": "product" } },
                 "connections": {
                    "S1": { "sourceEquipment": "FEED", "sourcePort": "outlet",
                            "targetEquipment": "OUT", "targetPort": "inlet" } } }"#,
        )
        .unwrap();
        let Compiled::Ready(_, advisories) = compile(&request, &SolveOptions::default()) else {
            panic!("advisories must not block");
        };
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].code, codes::HIGH_TDS);
    }
}
