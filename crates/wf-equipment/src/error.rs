//! Error types for equipment evaluation.

use thiserror::Error;
use wf_core::WfError;
use wf_water::WaterError;

/// Errors that stop a model from producing outlet states at all.
///
/// Engineering limit breaches are not errors; they are reported as
/// [`PhysicalViolation`](crate::PhysicalViolation)s alongside a result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquipmentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Missing inlet stream on port '{port}'")]
    MissingInlet { port: &'static str },

    #[error(transparent)]
    Water(#[from] WaterError),
}

pub type EquipmentResult<T> = Result<T, EquipmentError>;

impl From<EquipmentError> for WfError {
    fn from(e: EquipmentError) -> Self {
        match e {
            EquipmentError::NonPhysical { what } => WfError::InvalidArg { what },
            EquipmentError::InvalidArg { what } => WfError::InvalidArg { what },
            EquipmentError::MissingInlet { port } => WfError::Invariant {
                what: format!("missing inlet stream on port '{port}'"),
            },
            EquipmentError::Water(w) => w.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EquipmentError::MissingInlet { port: "feed" };
        assert!(err.to_string().contains("feed"));
    }

    #[test]
    fn error_conversion() {
        let err = EquipmentError::InvalidArg { what: "test" };
        let wf: WfError = err.into();
        assert!(matches!(wf, WfError::InvalidArg { .. }));
    }
}
