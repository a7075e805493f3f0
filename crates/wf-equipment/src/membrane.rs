//! Ultrafiltration membrane model.
//!
//! ## Model
//!
//! Darcy flux through a clean membrane plus a fouling layer, reduced by the
//! osmotic back-pressure of the polarised boundary layer:
//!
//! ```text
//! J  = (TMP − Δπ(J)) / (μ(T) · (Rm + Rf))
//! Δπ = π(c_f · CP(J)),   CP(J) = min(exp(J / k), 3),   k = 2e-5 · v^0.8
//! π  = (c / M) · R · T   (van't Hoff, M = 100 kg/mol)
//! Rm = 1 / (μ20 · Lp)
//! Rf = Rf,max · (1 − exp(−r · t / Rf,max)),  Rf,max = 2.5 · Rm
//! r  = 5e-3 · Rm · (1 + c_f/10) · (J_hist / 60 LMH)   per hour
//! ```
//!
//! The right-hand side falls as J rises, so the flux equation has a single
//! root, found by bisection.

use serde::{Deserialize, Serialize};
use wf_core::units::constants::R_J_PER_MOL_K;
use wf_core::units::{bar_to_pa, celsius_to_kelvin, lmh_to_mps, mps_to_lmh, pa_to_bar};
use wf_core::{Severity, codes};
use wf_graph::PortSpec;
use wf_water::{Parameter, StreamState, viscosity};

use crate::common::{check_finite, kinds};
use crate::error::EquipmentResult;
use crate::metrics::MembraneMetrics;
use crate::traits::{EquipmentModel, Evaluation, PhysicalViolation, PortStreams};

pub const FEED: &str = "feed";
pub const PERMEATE: &str = "permeate";
pub const CONCENTRATE: &str = "concentrate";

pub(crate) const PORTS: &[PortSpec] = &[
    PortSpec::inlet(FEED, kinds::MEMBRANE_FEED).rated(0.15, 6.0),
    PortSpec::outlet(PERMEATE, kinds::PERMEATE).rated(0.15, 6.0),
    PortSpec::outlet(CONCENTRATE, kinds::CONCENTRATE).rated(0.15, 6.0),
];

/// Effective molar mass of retained colloids, kg/mol.
const SOLUTE_MOLAR_MASS: f64 = 100.0;
/// Film mass-transfer coefficient prefactor, m/s at 1 m/s crossflow.
const MASS_TRANSFER_COEFF: f64 = 2e-5;
const CP_CAP: f64 = 3.0;
/// Fouling growth rate prefactor, fraction of Rm per hour.
const FOULING_RATE: f64 = 5e-3;
const FOULING_CEILING: f64 = 2.5;
/// Reference flux for fouling growth and membrane wear, LMH.
const REFERENCE_FLUX_LMH: f64 = 60.0;
const PUMP_EFFICIENCY: f64 = 0.75;
const MAX_SPECIFIC_ENERGY: f64 = 2.0;
const BASE_LIFE_MONTHS: f64 = 24.0;
const MIN_LIFE_MONTHS: f64 = 6.0;

/// Membrane polymer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembraneMaterial {
    #[default]
    Pvdf,
    Ptfe,
    Pes,
}

impl MembraneMaterial {
    /// Clean-water permeability at 20 °C, LMH/bar.
    pub fn permeability_lmh_bar(self) -> f64 {
        match self {
            MembraneMaterial::Pvdf => 50.0,
            MembraneMaterial::Ptfe => 60.0,
            MembraneMaterial::Pes => 40.0,
        }
    }

    /// Rated transmembrane pressure, bar.
    pub fn max_pressure_bar(self) -> f64 {
        match self {
            MembraneMaterial::Pvdf => 3.0,
            MembraneMaterial::Ptfe => 4.0,
            MembraneMaterial::Pes => 2.5,
        }
    }

    pub fn max_temperature_c(self) -> f64 {
        match self {
            MembraneMaterial::Pvdf => 60.0,
            MembraneMaterial::Ptfe => 80.0,
            MembraneMaterial::Pes => 45.0,
        }
    }

    /// Clean-membrane hydraulic resistance, 1/m.
    pub fn clean_resistance(self) -> f64 {
        let lp = lmh_to_mps(self.permeability_lmh_bar()) / bar_to_pa(1.0);
        1.0 / (viscosity(20.0) * lp)
    }
}

/// Fraction of each parameter held back by a UF membrane.
pub fn rejection(p: Parameter) -> f64 {
    match p {
        Parameter::Turbidity => 0.99,
        Parameter::Tss => 0.99,
        Parameter::Fog => 0.9,
        Parameter::Iron => 0.9,
        Parameter::Manganese => 0.5,
        Parameter::Bod | Parameter::Cod => 0.3,
        Parameter::Phosphate => 0.2,
        _ => 0.0,
    }
}

/// Rejection of suspended solids carried as the stream concentration.
const SOLIDS_REJECTION: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MembraneConfig {
    /// m²
    pub membrane_area: f64,
    /// bar
    pub transmembrane_pressure: f64,
    /// m/s
    pub crossflow_velocity: f64,
    /// Cumulative hours on line since the last clean.
    pub operating_hours: f64,
    /// Average flux over those hours, LMH.
    pub historical_flux_lmh: f64,
    pub membrane_type: MembraneMaterial,
    /// Design-point temperature, °C. Overrides the feed temperature in the
    /// transport calculation when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Design-point solids concentration, g/L. Overrides the feed
    /// concentration in the transport calculation when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_concentration: Option<f64>,
    /// Feed-to-concentrate channel pressure loss, bar.
    pub channel_pressure_drop: f64,
    pub max_flux_lmh: f64,
    pub max_recovery_pct: f64,
}

impl Default for MembraneConfig {
    fn default() -> Self {
        Self {
            membrane_area: 100.0,
            transmembrane_pressure: 1.5,
            crossflow_velocity: 2.0,
            operating_hours: 0.0,
            historical_flux_lmh: REFERENCE_FLUX_LMH,
            membrane_type: MembraneMaterial::default(),
            temperature: None,
            feed_concentration: None,
            channel_pressure_drop: 0.2,
            max_flux_lmh: 120.0,
            max_recovery_pct: 98.0,
        }
    }
}

/// Result of the flux calculation alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxSolution {
    /// m/s
    pub flux: f64,
    pub cp_factor: f64,
    /// Pa
    pub osmotic_pressure: f64,
    /// Pa
    pub net_driving_pressure: f64,
    /// Pa·s
    pub viscosity: f64,
    /// 1/m
    pub clean_resistance: f64,
    /// 1/m
    pub fouling_resistance: f64,
}

impl MembraneConfig {
    /// Fouling resistance after `operating_hours` at `historical_flux_lmh`.
    pub fn fouling_resistance(&self, concentration_g_l: f64) -> f64 {
        let rm = self.membrane_type.clean_resistance();
        let ceiling = FOULING_CEILING * rm;
        let rate = FOULING_RATE
            * rm
            * (1.0 + concentration_g_l.max(0.0) / 10.0)
            * (self.historical_flux_lmh.max(0.0) / REFERENCE_FLUX_LMH);
        ceiling * (1.0 - (-rate * self.operating_hours.max(0.0) / ceiling).exp())
    }

    fn mass_transfer_coefficient(&self) -> f64 {
        MASS_TRANSFER_COEFF * self.crossflow_velocity.max(0.0).powf(0.8)
    }

    /// Polarisation factor at flux `j` (m/s).
    fn cp_factor(&self, j: f64) -> f64 {
        let k = self.mass_transfer_coefficient();
        if k <= 0.0 {
            return CP_CAP;
        }
        (j / k).exp().min(CP_CAP)
    }

    /// Solve the flux equation at the given feed temperature and solids
    /// concentration.
    pub fn solve_flux(&self, temperature_c: f64, concentration_g_l: f64) -> EquipmentResult<FluxSolution> {
        let t = self.temperature.unwrap_or(temperature_c);
        let c = self.feed_concentration.unwrap_or(concentration_g_l).max(0.0);
        check_finite(t, "membrane temperature")?;
        check_finite(c, "membrane feed concentration")?;

        let mu = viscosity(t);
        let rm = self.membrane_type.clean_resistance();
        let rf = self.fouling_resistance(c);
        let resistance = mu * (rm + rf);
        let tmp = bar_to_pa(self.transmembrane_pressure);
        // kg/m³ → mol/m³ → Pa
        let osmotic = |cp: f64| c * cp / SOLUTE_MOLAR_MASS * R_J_PER_MOL_K * celsius_to_kelvin(t);

        let residual = |j: f64| j * resistance - (tmp - osmotic(self.cp_factor(j)));

        let flux = if residual(0.0) >= 0.0 {
            0.0
        } else {
            // residual(hi) >= 0 because osmotic pressure is never negative.
            let (mut lo, mut hi) = (0.0, tmp / resistance);
            for _ in 0..200 {
                let mid = 0.5 * (lo + hi);
                if residual(mid) < 0.0 {
                    lo = mid;
                } else {
                    hi = mid;
                }
                if hi - lo <= f64::EPSILON * hi {
                    break;
                }
            }
            0.5 * (lo + hi)
        };
        check_finite(flux, "membrane flux")?;

        let cp_factor = self.cp_factor(flux);
        let osmotic_pressure = osmotic(cp_factor);
        Ok(FluxSolution {
            flux,
            cp_factor,
            osmotic_pressure,
            net_driving_pressure: tmp - osmotic_pressure,
            viscosity: mu,
            clean_resistance: rm,
            fouling_resistance: rf,
        })
    }

    /// kWh per m³ of permeate to pressurise the feed across the membrane.
    fn specific_energy(&self, feed_flow: f64, permeate_flow: f64) -> f64 {
        if permeate_flow <= 0.0 {
            return MAX_SPECIFIC_ENERGY;
        }
        let per_m3_feed = bar_to_pa(self.transmembrane_pressure) / (PUMP_EFFICIENCY * 3.6e6);
        (per_m3_feed * feed_flow / permeate_flow).min(MAX_SPECIFIC_ENERGY)
    }

    /// Months until replacement at this flux and fouling state.
    fn membrane_life(flux_lmh: f64, rf: f64, rm: f64) -> f64 {
        let flux_factor = (flux_lmh / REFERENCE_FLUX_LMH).max(1.0);
        let fouling_factor = (rf / rm).max(1.0);
        (BASE_LIFE_MONTHS / (flux_factor * fouling_factor)).max(MIN_LIFE_MONTHS)
    }

    fn check_limits(
        &self,
        feed: &StreamState,
        sol: &FluxSolution,
        flux_lmh: f64,
        recovery: f64,
    ) -> Vec<PhysicalViolation> {
        let mut v = Vec::new();
        let material = self.membrane_type;
        let t = self.temperature.unwrap_or(feed.temperature);

        if sol.net_driving_pressure <= 0.0 {
            v.push(PhysicalViolation::new(
                codes::NEGATIVE_NET_PRESSURE,
                Severity::Error,
                format!(
                    "Net driving pressure {:.3} bar is not positive; increase TMP or reduce fouling",
                    pa_to_bar(sol.net_driving_pressure)
                ),
            ));
        }
        if flux_lmh > self.max_flux_lmh {
            v.push(PhysicalViolation::new(
                codes::HIGH_FLUX,
                Severity::Error,
                format!(
                    "Flux {:.1} LMH exceeds maximum {:.1} LMH",
                    flux_lmh, self.max_flux_lmh
                ),
            ));
        }
        if recovery > self.max_recovery_pct {
            v.push(PhysicalViolation::new(
                codes::RECOVERY_CEILING,
                Severity::Error,
                format!(
                    "Recovery {:.1}% exceeds maximum {:.1}%",
                    recovery, self.max_recovery_pct
                ),
            ));
        }
        if self.transmembrane_pressure > material.max_pressure_bar() {
            v.push(PhysicalViolation::new(
                codes::TMP_RATING,
                Severity::Critical,
                format!(
                    "TMP {:.2} bar exceeds the {:?} rating of {:.1} bar",
                    self.transmembrane_pressure,
                    material,
                    material.max_pressure_bar()
                ),
            ));
        }
        if t > material.max_temperature_c() {
            v.push(PhysicalViolation::new(
                codes::MEMBRANE_TEMPERATURE,
                Severity::Error,
                format!(
                    "Temperature {:.1} °C exceeds the {:?} limit of {:.0} °C",
                    t,
                    material,
                    material.max_temperature_c()
                ),
            ));
        }
        if feed.flow_rate > 0.0 && feed.pressure < self.transmembrane_pressure {
            v.push(PhysicalViolation::new(
                codes::LOW_FEED_PRESSURE,
                Severity::Warning,
                format!(
                    "Feed pressure {:.2} bar is below the TMP set-point {:.2} bar",
                    feed.pressure, self.transmembrane_pressure
                ),
            ));
        }
        v
    }
}

impl EquipmentModel for MembraneConfig {
    fn type_name(&self) -> &'static str {
        "membrane"
    }

    fn ports(&self) -> &'static [PortSpec] {
        PORTS
    }

    fn evaluate(&self, inlets: &PortStreams) -> EquipmentResult<Evaluation> {
        let feed = inlets.require(FEED)?;
        let sol = self.solve_flux(feed.temperature, feed.concentration)?;

        let flux_lmh = mps_to_lmh(sol.flux);
        let permeate_flow = (flux_lmh * self.membrane_area / 1000.0).min(feed.flow_rate);
        let concentrate_flow = (feed.flow_rate - permeate_flow).max(0.0);
        let recovery = if feed.flow_rate > 0.0 {
            permeate_flow / feed.flow_rate * 100.0
        } else {
            0.0
        };

        // Species: permeate by rejection, concentrate closes the balance.
        let permeate_quality = feed.quality.scaled_by(|p| 1.0 - rejection(p));
        let concentrate_quality = feed.quality.scaled_by(|p| {
            if concentrate_flow <= 0.0 {
                return 1.0;
            }
            (feed.flow_rate - permeate_flow * (1.0 - rejection(p))) / concentrate_flow
        });
        let permeate_conc = feed.concentration * (1.0 - SOLIDS_REJECTION);
        let concentrate_conc = if concentrate_flow > 0.0 {
            (feed.flow_rate * feed.concentration - permeate_flow * permeate_conc) / concentrate_flow
        } else {
            feed.concentration
        };

        let permeate = StreamState {
            flow_rate: permeate_flow,
            pressure: (feed.pressure - self.transmembrane_pressure).max(0.0),
            temperature: feed.temperature,
            concentration: permeate_conc,
            quality: permeate_quality,
        };
        let concentrate = StreamState {
            flow_rate: concentrate_flow,
            pressure: (feed.pressure - self.channel_pressure_drop).max(0.0),
            temperature: feed.temperature,
            concentration: concentrate_conc,
            quality: concentrate_quality,
        };

        let violations = self.check_limits(feed, &sol, flux_lmh, recovery);
        let metrics = MembraneMetrics {
            permeate_flow,
            concentrate_flow,
            recovery,
            flux: flux_lmh,
            transmembrane_pressure: self.transmembrane_pressure,
            net_driving_pressure: pa_to_bar(sol.net_driving_pressure),
            osmotic_pressure: pa_to_bar(sol.osmotic_pressure),
            cp_factor: sol.cp_factor,
            clean_resistance: sol.clean_resistance,
            fouling_resistance: sol.fouling_resistance,
            viscosity: sol.viscosity,
            energy_consumption: self.specific_energy(feed.flow_rate, permeate_flow),
            membrane_life_months: Self::membrane_life(
                flux_lmh,
                sol.fouling_resistance,
                sol.clean_resistance,
            ),
        };

        let outlets = PortStreams::new()
            .with(PERMEATE, permeate)
            .with(CONCENTRATE, concentrate);
        Ok(Evaluation::new(outlets, metrics).with_violations(violations))
    }
}
