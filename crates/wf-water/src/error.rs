//! Water property errors.

use thiserror::Error;
use wf_core::WfError;

/// Result type for water property operations.
pub type WaterResult<T> = Result<T, WaterError>;

/// Errors raised while building or combining stream states.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaterError {
    /// Non-physical values (negative flow, NaN temperature, ...).
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Value out of valid range.
    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<WaterError> for WfError {
    fn from(err: WaterError) -> Self {
        match err {
            WaterError::NonPhysical { what, value } => WfError::Invariant {
                what: format!("Non-physical water value: {what} = {value}"),
            },
            WaterError::OutOfRange { what, value } => WfError::Invariant {
                what: format!("Water value out of range: {what} = {value}"),
            },
            WaterError::InvalidArg { what } => WfError::InvalidArg { what },
        }
    }
}
