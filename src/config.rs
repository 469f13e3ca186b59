use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::NormalizerOptions;
use crate::score::ScoringOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub aliases: AliasesConfig,
    #[serde(default)]
    pub specs: CatalogFile,
    #[serde(default)]
    pub documents: CatalogFile,
    #[serde(default)]
    pub normalizer: NormalizerOptions,
    #[serde(default)]
    pub scoring: ScoringOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasesConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for AliasesConfig {
    fn default() -> Self {
        Self { path: None, ttl_secs: default_ttl_secs() }
    }
}

impl AliasesConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load and validate an engine config. Relative catalog paths are resolved
/// against the config file's directory.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    let mut cfg: EngineConfig = if raw.trim().is_empty() {
        EngineConfig::default()
    } else {
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?
    };

    if cfg.scoring.identity_fields.iter().any(|f| f.trim().is_empty()) {
        return Err(ConfigError::Invalid("empty entry in scoring.identity_fields".into()));
    }

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for slot in [&mut cfg.aliases.path, &mut cfg.specs.path, &mut cfg.documents.path] {
        if let Some(p) = slot.as_mut() {
            if p.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("empty catalog path".into()));
            }
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
    Ok(cfg)
}
