//! Error types for solver operations.

use thiserror::Error;
use wf_core::WfError;
use wf_equipment::EquipmentError;
use wf_project::ProjectError;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Equipment '{equipment}': {source}")]
    Equipment {
        equipment: String,
        #[source]
        source: EquipmentError,
    },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for WfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Project(_) => WfError::InvalidArg { what: "project" },
            SolverError::Equipment { source, .. } => source.into(),
        }
    }
}
