//! Source-water characterisation for feed sources.
//!
//! Scores raw-water quality the way a process engineer screens a new intake:
//! a Silt Density Index estimate, a treatment-difficulty grade, a membrane
//! fouling-potential grade and a list of recommended pretreatment steps.

use crate::quality::WaterQuality;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    SurfaceWater,
    Groundwater,
    Municipal,
    Industrial,
}

impl SourceType {
    /// Baseline pretreatment for the source type, before quality-driven additions.
    fn baseline_pretreatment(self) -> &'static [&'static str] {
        match self {
            SourceType::SurfaceWater => &["coagulation", "sedimentation", "filtration"],
            SourceType::Groundwater => &["iron_removal", "hardness_removal"],
            SourceType::Municipal => &["chlorine_removal", "ph_adjustment"],
            SourceType::Industrial => &[
                "neutralization",
                "heavy_metal_removal",
                "organics_removal",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentDifficulty {
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulingPotential {
    Low,
    Medium,
    High,
}

/// Outcome of [`assess_source`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAssessment {
    pub sdi_estimate: f64,
    pub treatment_difficulty: TreatmentDifficulty,
    pub fouling_potential: FoulingPotential,
    pub recommended_pretreatment: Vec<String>,
}

pub fn assess_source(source: SourceType, q: &WaterQuality) -> SourceAssessment {
    SourceAssessment {
        sdi_estimate: estimate_sdi(q),
        treatment_difficulty: treatment_difficulty(q),
        fouling_potential: fouling_potential(q),
        recommended_pretreatment: recommend_pretreatment(source, q),
    }
}

/// Empirical SDI estimate from turbidity, TSS, iron, COD and FOG, clamped to [1, 15].
pub fn estimate_sdi(q: &WaterQuality) -> f64 {
    let sdi = 1.0 + q.turbidity * 0.2 + q.tss * 0.05 + q.iron * 2.0 + q.cod * 0.01 + q.fog * 0.1;
    sdi.clamp(1.0, 15.0)
}

fn band(value: f64, high: f64, moderate: f64) -> u32 {
    if value > high {
        2
    } else if value > moderate {
        1
    } else {
        0
    }
}

pub fn treatment_difficulty(q: &WaterQuality) -> TreatmentDifficulty {
    let mut score = band(q.turbidity, 10.0, 5.0)
        + band(q.tss, 50.0, 20.0)
        + band(q.tds, 1000.0, 500.0)
        + band(q.cod, 100.0, 50.0)
        + band(q.fog, 20.0, 10.0);
    if q.ph < 6.0 || q.ph > 9.0 {
        score += 2;
    } else if q.ph < 6.5 || q.ph > 8.5 {
        score += 1;
    }
    if q.hardness > 300.0 {
        score += 1;
    }

    match score {
        6.. => TreatmentDifficulty::VeryHigh,
        4..=5 => TreatmentDifficulty::High,
        2..=3 => TreatmentDifficulty::Medium,
        _ => TreatmentDifficulty::Low,
    }
}

pub fn fouling_potential(q: &WaterQuality) -> FoulingPotential {
    let checks = [
        // organic
        q.cod > 10.0,
        q.bod > 5.0,
        q.fog > 5.0,
        // inorganic
        q.hardness > 200.0,
        q.iron > 0.2,
        q.manganese > 0.05,
        // colloidal
        q.turbidity > 1.0,
        q.tss > 10.0,
    ];
    match checks.iter().filter(|&&c| c).count() {
        5.. => FoulingPotential::High,
        3..=4 => FoulingPotential::Medium,
        _ => FoulingPotential::Low,
    }
}

pub fn recommend_pretreatment(source: SourceType, q: &WaterQuality) -> Vec<String> {
    let mut steps: Vec<String> = source
        .baseline_pretreatment()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut add = |step: &str| {
        if !steps.iter().any(|s| s == step) {
            steps.push(step.to_string());
        }
    };

    if q.turbidity > 5.0 {
        add("coagulation");
    }
    if q.ph < 6.5 || q.ph > 8.5 {
        add("ph_adjustment");
    }
    if q.hardness > 200.0 {
        add("hardness_removal");
    }
    if q.iron > 0.3 {
        add("iron_removal");
    }
    if q.cod > 50.0 {
        add("activated_carbon");
    }
    if q.tss > 30.0 {
        add("filtration");
    }
    if q.fog > 10.0 {
        add("oil_water_separation");
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_water_is_easy() {
        let a = assess_source(SourceType::Municipal, &WaterQuality::default());
        assert_eq!(a.treatment_difficulty, TreatmentDifficulty::Low);
        // default: cod 50, bod 20, iron 0.5, manganese 0.1 => 4 hits
        assert_eq!(a.fouling_potential, FoulingPotential::Medium);
        assert!((a.sdi_estimate - 3.7).abs() < 1e-12);
    }

    #[test]
    fn dirty_water_is_very_high() {
        let q = WaterQuality {
            turbidity: 50.0,
            tss: 200.0,
            tds: 1500.0,
            cod: 300.0,
            fog: 40.0,
            ph: 5.0,
            ..WaterQuality::default()
        };
        assert_eq!(treatment_difficulty(&q), TreatmentDifficulty::VeryHigh);
        assert_eq!(estimate_sdi(&q), 15.0);
    }

    #[test]
    fn pretreatment_has_no_duplicates() {
        let q = WaterQuality {
            turbidity: 20.0,
            tss: 60.0,
            ..WaterQuality::default()
        };
        let steps = recommend_pretreatment(SourceType::SurfaceWater, &q);
        let coag = steps.iter().filter(|s| *s == "coagulation").count();
        assert_eq!(coag, 1);
        assert_eq!(steps.iter().filter(|s| *s == "filtration").count(), 1);
        assert!(steps.contains(&"iron_removal".to_string()));
    }
}
