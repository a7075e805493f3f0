//! wf-equipment: equipment model library for water-treatment flowsheets.
//!
//! Provides one pure transport model per equipment type:
//! - Feed sources with source-water characterisation
//! - Buffer tanks with level projection and settling
//! - Centrifugal pumps on a quadratic head curve
//! - Mesh strainers with solids routed to drain
//! - Ultrafiltration membranes (Darcy flux, polarisation, fouling)
//! - Splitters and terminal product/waste sinks
//!
//! Every model maps inlet stream states to outlet states, metrics and
//! engineering-limit violations, and is dispatched through the closed
//! [`EquipmentConfig`] enum.
//!
//! # Example
//!
//! ```
//! use wf_equipment::{EquipmentConfig, MembraneConfig, PortStreams};
//! use wf_water::{StreamState, WaterQuality};
//!
//! let uf = EquipmentConfig::Membrane(MembraneConfig {
//!     membrane_area: 500.0,
//!     transmembrane_pressure: 1.5,
//!     ..MembraneConfig::default()
//! });
//! let feed = StreamState::new(100.0, 2.5, 25.0, 0.1, WaterQuality::default());
//! let eval = uf.evaluate(&PortStreams::new().with("feed", feed)).unwrap();
//!
//! let recovery = eval.metrics.recovery().unwrap();
//! assert!(recovery > 39.0 && recovery < 40.0);
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod feed_source;
pub mod membrane;
pub mod metrics;
pub mod pump;
pub mod sink;
pub mod splitter;
pub mod strainer;
pub mod tank;
pub mod traits;

// Re-exports
pub use config::{EquipmentConfig, EquipmentKind};
pub use error::{EquipmentError, EquipmentResult};
pub use feed_source::FeedSourceConfig;
pub use membrane::{MembraneConfig, MembraneMaterial};
pub use metrics::EquipmentMetrics;
pub use pump::PumpConfig;
pub use sink::SinkConfig;
pub use splitter::SplitterConfig;
pub use strainer::StrainerConfig;
pub use tank::TankConfig;
pub use traits::{EquipmentModel, Evaluation, MassBalance, PhysicalViolation, PortStreams};
