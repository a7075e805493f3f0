//! The water-quality vector carried by every stream.

use serde::{Deserialize, Serialize};

/// One entry of the water-quality vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Turbidity,
    Tss,
    Tds,
    Fog,
    Bod,
    Cod,
    Ph,
    Alkalinity,
    Hardness,
    Chloride,
    Sulfate,
    Nitrate,
    Phosphate,
    Iron,
    Manganese,
}

impl Parameter {
    /// All parameters in vector order.
    pub const ALL: [Parameter; 15] = [
        Parameter::Turbidity,
        Parameter::Tss,
        Parameter::Tds,
        Parameter::Fog,
        Parameter::Bod,
        Parameter::Cod,
        Parameter::Ph,
        Parameter::Alkalinity,
        Parameter::Hardness,
        Parameter::Chloride,
        Parameter::Sulfate,
        Parameter::Nitrate,
        Parameter::Phosphate,
        Parameter::Iron,
        Parameter::Manganese,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Turbidity => "turbidity",
            Parameter::Tss => "tss",
            Parameter::Tds => "tds",
            Parameter::Fog => "fog",
            Parameter::Bod => "bod",
            Parameter::Cod => "cod",
            Parameter::Ph => "ph",
            Parameter::Alkalinity => "alkalinity",
            Parameter::Hardness => "hardness",
            Parameter::Chloride => "chloride",
            Parameter::Sulfate => "sulfate",
            Parameter::Nitrate => "nitrate",
            Parameter::Phosphate => "phosphate",
            Parameter::Iron => "iron",
            Parameter::Manganese => "manganese",
        }
    }

    /// Unit label for reports.
    pub fn unit(self) -> &'static str {
        match self {
            Parameter::Turbidity => "NTU",
            Parameter::Ph => "pH",
            Parameter::Alkalinity | Parameter::Hardness => "mg/L as CaCO3",
            _ => "mg/L",
        }
    }

    /// Whether the parameter is a conserved concentration. pH is not: it mixes
    /// through hydrogen-ion activity and is never split by separation.
    pub fn is_concentration(self) -> bool {
        !matches!(self, Parameter::Ph)
    }
}

/// Fifteen-parameter water-quality vector.
///
/// Concentrations are non-negative, pH is bounded to [0, 14].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterQuality {
    /// NTU
    pub turbidity: f64,
    /// Total suspended solids, mg/L
    pub tss: f64,
    /// Total dissolved solids, mg/L
    pub tds: f64,
    /// Fats, oils and grease, mg/L
    pub fog: f64,
    /// Biochemical oxygen demand, mg/L
    pub bod: f64,
    /// Chemical oxygen demand, mg/L
    pub cod: f64,
    pub ph: f64,
    /// mg/L as CaCO3
    pub alkalinity: f64,
    /// mg/L as CaCO3
    pub hardness: f64,
    pub chloride: f64,
    pub sulfate: f64,
    pub nitrate: f64,
    pub phosphate: f64,
    pub iron: f64,
    pub manganese: f64,
}

impl Default for WaterQuality {
    /// Typical lightly loaded surface water.
    fn default() -> Self {
        Self {
            turbidity: 1.0,
            tss: 10.0,
            tds: 500.0,
            fog: 5.0,
            bod: 20.0,
            cod: 50.0,
            ph: 7.0,
            alkalinity: 100.0,
            hardness: 150.0,
            chloride: 50.0,
            sulfate: 30.0,
            nitrate: 10.0,
            phosphate: 2.0,
            iron: 0.5,
            manganese: 0.1,
        }
    }
}

impl WaterQuality {
    pub fn get(&self, p: Parameter) -> f64 {
        match p {
            Parameter::Turbidity => self.turbidity,
            Parameter::Tss => self.tss,
            Parameter::Tds => self.tds,
            Parameter::Fog => self.fog,
            Parameter::Bod => self.bod,
            Parameter::Cod => self.cod,
            Parameter::Ph => self.ph,
            Parameter::Alkalinity => self.alkalinity,
            Parameter::Hardness => self.hardness,
            Parameter::Chloride => self.chloride,
            Parameter::Sulfate => self.sulfate,
            Parameter::Nitrate => self.nitrate,
            Parameter::Phosphate => self.phosphate,
            Parameter::Iron => self.iron,
            Parameter::Manganese => self.manganese,
        }
    }

    pub fn set(&mut self, p: Parameter, value: f64) {
        let slot = match p {
            Parameter::Turbidity => &mut self.turbidity,
            Parameter::Tss => &mut self.tss,
            Parameter::Tds => &mut self.tds,
            Parameter::Fog => &mut self.fog,
            Parameter::Bod => &mut self.bod,
            Parameter::Cod => &mut self.cod,
            Parameter::Ph => &mut self.ph,
            Parameter::Alkalinity => &mut self.alkalinity,
            Parameter::Hardness => &mut self.hardness,
            Parameter::Chloride => &mut self.chloride,
            Parameter::Sulfate => &mut self.sulfate,
            Parameter::Nitrate => &mut self.nitrate,
            Parameter::Phosphate => &mut self.phosphate,
            Parameter::Iron => &mut self.iron,
            Parameter::Manganese => &mut self.manganese,
        };
        *slot = value;
    }

    /// Parameters whose value is non-finite, negative, or (for pH) outside [0, 14].
    pub fn out_of_domain(&self) -> Vec<(Parameter, f64)> {
        Parameter::ALL
            .iter()
            .map(|&p| (p, self.get(p)))
            .filter(|&(p, v)| {
                !v.is_finite() || v < 0.0 || (p == Parameter::Ph && v > 14.0)
            })
            .collect()
    }

    /// Weighted blend of several quality vectors.
    ///
    /// Concentrations blend linearly; pH blends through hydrogen-ion
    /// activity. Weights must be non-negative with a positive sum.
    pub fn blend(parts: &[(f64, &WaterQuality)]) -> WaterQuality {
        let total: f64 = parts.iter().map(|(w, _)| *w).sum();
        let mut out = WaterQuality::default();
        if parts.is_empty() {
            return out;
        }
        let equal = 1.0 / parts.len() as f64;
        let weight = |w: f64| if total > 0.0 { w / total } else { equal };

        for p in Parameter::ALL {
            let value = if p.is_concentration() {
                parts.iter().map(|(w, q)| weight(*w) * q.get(p)).sum()
            } else {
                let h: f64 = parts
                    .iter()
                    .map(|(w, q)| weight(*w) * 10f64.powf(-q.ph))
                    .sum();
                if h > 0.0 { (-h.log10()).clamp(0.0, 14.0) } else { 7.0 }
            };
            out.set(p, value);
        }
        out
    }

    /// Copy with every concentration multiplied by the per-parameter factor
    /// returned by `factor`. pH is left untouched.
    pub fn scaled_by(&self, factor: impl Fn(Parameter) -> f64) -> WaterQuality {
        let mut out = *self;
        for p in Parameter::ALL {
            if p.is_concentration() {
                out.set(p, (self.get(p) * factor(p)).max(0.0));
            }
        }
        out
    }
}
