use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::ValidationReport;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("WriteFailed: {0}")]
    WriteFailed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitPaths {
    pub report_path: String,
}

/// Report as emitted: the validation report plus a content fingerprint.
pub fn report_json(report: &ValidationReport) -> serde_json::Value {
    let mut value = serde_json::to_value(report).unwrap_or(serde_json::Value::Null);
    if let Some(obj) = value.as_object_mut() {
        obj.insert("report_fingerprint".to_string(), serde_json::json!(report_fingerprint(report)));
    }
    value
}

/// SHA-256 over the serialized report; identical inputs give identical
/// fingerprints.
pub fn report_fingerprint(report: &ValidationReport) -> String {
    let bytes = serde_json::to_vec(report).unwrap_or_default();
    sha256_hex(&bytes)
}

/// Atomically write `<doc_id>.report.json` into outdir.
pub fn emit_report(report: &ValidationReport, outdir: &str, doc_id: &str) -> Result<EmitPaths, EmitError> {
    std::fs::create_dir_all(outdir).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    let report_path = Path::new(outdir).join(format!("{}.report.json", doc_id));
    let tmp = report_path.with_extension(format!("json.tmp.{}", std::process::id()));
    let bytes = serde_json::to_vec_pretty(&report_json(report)).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::write(&tmp, bytes).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::rename(&tmp, &report_path).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    Ok(EmitPaths { report_path: report_path.to_string_lossy().to_string() })
}

// Utility to compute sha256 hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    out.iter().map(|b| format!("{:02x}", b)).collect()
}
