use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure of a data-access collaborator (alias rows, field specs,
/// mandatory documents). Consumers degrade instead of propagating it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("SourceUnavailable: {0}")]
    Unavailable(String),
    #[error("SourceMalformed: {0}")]
    Malformed(String),
}

/// Read a YAML (or JSON) list of rows from a catalog file.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| SourceError::Unavailable(format!("{}: {}", path.display(), e)))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(&raw).map_err(|e| SourceError::Malformed(format!("{}: {}", path.display(), e)))
}
