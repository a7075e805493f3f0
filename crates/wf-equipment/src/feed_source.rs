//! Raw-water intake.
//!
//! Emits the configured stream and characterises the source water for
//! pretreatment planning.

use serde::{Deserialize, Serialize};
use wf_graph::PortSpec;
use wf_water::{SourceType, StreamState, WaterQuality, assess_source};

use crate::common::{check_finite, kinds};
use crate::error::EquipmentResult;
use crate::metrics::FeedSourceMetrics;
use crate::traits::{EquipmentModel, Evaluation, PortStreams};

pub const OUTLET: &str = "outlet";

pub(crate) const PORTS: &[PortSpec] = &[PortSpec::outlet(OUTLET, kinds::RAW).rated(0.2, 10.0)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedSourceConfig {
    /// m³/h
    pub flow_rate: f64,
    /// bar
    pub pressure: f64,
    /// °C
    pub temperature: f64,
    /// Suspended solids, g/L.
    pub concentration: f64,
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub water_quality: WaterQuality,
}

impl Default for FeedSourceConfig {
    fn default() -> Self {
        Self {
            flow_rate: 100.0,
            pressure: 2.5,
            temperature: 25.0,
            concentration: 0.1,
            source_type: SourceType::default(),
            description: String::new(),
            water_quality: WaterQuality::default(),
        }
    }
}

impl FeedSourceConfig {
    /// The stream this source delivers.
    pub fn stream(&self) -> StreamState {
        StreamState::new(
            self.flow_rate,
            self.pressure,
            self.temperature,
            self.concentration,
            self.water_quality,
        )
    }
}

impl EquipmentModel for FeedSourceConfig {
    fn type_name(&self) -> &'static str {
        "feed_source"
    }

    fn ports(&self) -> &'static [PortSpec] {
        PORTS
    }

    fn evaluate(&self, _inlets: &PortStreams) -> EquipmentResult<Evaluation> {
        let out = self.stream();
        check_finite(out.flow_rate, "feed flow")?;
        let metrics = FeedSourceMetrics {
            flow_rate: out.flow_rate,
            assessment: assess_source(self.source_type, &self.water_quality),
        };
        let mut eval = Evaluation::new(PortStreams::new().with(OUTLET, out), metrics);
        eval.external = -out.mass_flow();
        Ok(eval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::EquipmentMetrics;
    use wf_water::TreatmentDifficulty;

    #[test]
    fn emits_configured_stream() {
        let cfg = FeedSourceConfig::default();
        let e = cfg.evaluate(&PortStreams::new()).unwrap();
        let out = e.outlets.get(OUTLET).unwrap();
        assert_eq!(out.flow_rate, 100.0);
        assert_eq!(out.temperature, 25.0);
        assert!(e.balance(&PortStreams::new()).closes(1e-12));
        match &e.metrics {
            EquipmentMetrics::FeedSource(m) => {
                assert_eq!(m.assessment.treatment_difficulty, TreatmentDifficulty::Low);
                assert!(!m.assessment.recommended_pretreatment.is_empty());
            }
            other => panic!("unexpected metrics {other:?}"),
        }
    }

    #[test]
    fn quality_parses_from_partial_json() {
        let cfg: FeedSourceConfig = serde_json::from_str(
            r#"{"flowRate": 40, "sourceType": "groundwater", "waterQuality": {"iron": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.flow_rate, 40.0);
        assert_eq!(cfg.source_type, SourceType::Groundwater);
        assert_eq!(cfg.water_quality.iron, 2.0);
        assert_eq!(cfg.water_quality.ph, 7.0);
    }
}
