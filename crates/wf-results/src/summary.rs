//! Diagnostic ordering and counts.

use serde::Serialize;
use wf_core::{Diagnostic, Severity};

/// Diagnostic counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSummary {
    pub total: usize,
    pub critical: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    /// True when any diagnostic is an error or critical.
    pub blocking: bool,
}

impl DiagnosticSummary {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut s = Self {
            total: diagnostics.len(),
            ..Self::default()
        };
        for d in diagnostics {
            match d.severity {
                Severity::Critical => s.critical += 1,
                Severity::Error => s.error += 1,
                Severity::Warning => s.warning += 1,
                Severity::Info => s.info += 1,
            }
        }
        s.blocking = s.critical + s.error > 0;
        s
    }
}

/// Critical first, then by equipment id (flowsheet-level first), then code.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.equipment_id.cmp(&b.equipment_id))
            .then_with(|| a.code.cmp(&b.code))
    });
}
