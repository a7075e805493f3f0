//! wf-project: solve-request format, loading and request-level checks.

pub mod schema;
pub mod validate;

use std::path::Path;

pub use schema::*;
pub use validate::{RequestIssue, check_options, check_request, typed_config};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file type: {path}")]
    UnsupportedFormat { path: String },
}

/// Parse a request. Content is not checked here; the solver reports
/// problems as diagnostics.
pub fn from_json_str(content: &str) -> ProjectResult<SolveRequest> {
    Ok(serde_json::from_str(content)?)
}

pub fn from_yaml_str(content: &str) -> ProjectResult<SolveRequest> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn load_json(path: &Path) -> ProjectResult<SolveRequest> {
    from_json_str(&std::fs::read_to_string(path)?)
}

pub fn load_yaml(path: &Path) -> ProjectResult<SolveRequest> {
    from_yaml_str(&std::fs::read_to_string(path)?)
}

/// Load by file extension: `.json`, `.yaml` or `.yml`.
pub fn load(path: &Path) -> ProjectResult<SolveRequest> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        Some("yaml" | "yml") => load_yaml(path),
        _ => Err(ProjectError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

pub fn save_json(path: &Path, request: &SolveRequest) -> ProjectResult<()> {
    let content = serde_json::to_string_pretty(request)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn save_yaml(path: &Path, request: &SolveRequest) -> ProjectResult<()> {
    let content = serde_yaml::to_string(request)?;
    std::fs::write(path, content)?;
    Ok(())
}
