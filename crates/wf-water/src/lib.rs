//! wf-water: water properties and stream state for waterflow.
//!
//! Provides:
//! - Temperature-dependent water properties (density, viscosity, Reynolds number)
//! - The fixed-shape water-quality vector carried by every stream
//! - `StreamState`, the per-stream property record, and flow-weighted mixing
//! - Source-water assessment (SDI, fouling potential, pretreatment advice)
//!
//! # Example
//!
//! ```
//! use wf_water::{StreamState, WaterQuality, mix};
//!
//! let a = StreamState::new(60.0, 1.2, 20.0, 0.1, WaterQuality::default());
//! let b = StreamState::new(40.0, 1.0, 30.0, 0.3, WaterQuality::default());
//! let mixed = mix(&[&a, &b]).unwrap();
//!
//! assert!((mixed.flow_rate - 100.0).abs() < 1e-12);
//! assert!((mixed.temperature - 24.0).abs() < 1e-12);
//! ```

pub mod assessment;
pub mod error;
pub mod properties;
pub mod quality;
pub mod stream;

// Re-exports for ergonomics
pub use assessment::{
    FoulingPotential, SourceAssessment, SourceType, TreatmentDifficulty, assess_source,
};
pub use error::{WaterError, WaterResult};
pub use properties::{density, reynolds_number, viscosity};
pub use quality::{Parameter, WaterQuality};
pub use stream::{StreamState, mix};
