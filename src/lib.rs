use std::path::{Path, PathBuf};

use globwalk::GlobWalkerBuilder;
use thiserror::Error;

pub mod aliases;
pub mod catalog;
pub mod config;
pub mod doctype;
pub mod engine;
pub mod formats;
pub mod keys;
pub mod layout;
pub mod normalize;
pub mod report;
pub mod rut;
pub mod score;
pub mod specs;
pub mod text;

pub use aliases::{AliasCache, AliasEntry, AliasResolver, AliasSource, AliasTable, FileAliasSource, StaticAliasSource};
pub use catalog::SourceError;
pub use config::{load_config, ConfigError, EngineConfig};
pub use doctype::{Classification, DocumentCatalog, DossierOverview, MandatoryDocumentEntry};
pub use engine::{Engine, ValidationReport};
pub use formats::{is_iso_date, looks_like_money, normalize_date, sanitize_money};
pub use layout::{mark_identity_errors, merge_page_layouts, page_index_from_filename, parse_layout_json, LayoutItem, PageLayout};
pub use normalize::{is_placeholder, FieldNormalizer, NormalizedFieldSet, NormalizerOptions, OverflowPolicy};
pub use report::{emit_report, report_fingerprint, report_json, sha256_hex, EmitError, EmitPaths};
pub use rut::{check_digit, clean_rut, format_rut, is_valid_rut};
pub use score::{required_coverage, ComplianceResult, ComplianceScorer, RequiredCoverage, ScoringOptions};
pub use specs::{check_specs, Datatype, FieldSpec, FileSpecSource, Issue, IssueType, SpecMatcher, SpecSource, StaticSpecSource};

#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("NoFilesFound")]
    NoFilesFound { pattern: String },
}

/// Enumerate dossier files using a glob pattern (e.g., "./dossier/**/*").
/// Returns a sorted list of paths.
pub fn enumerate_files(glob_pattern: &str) -> Result<Vec<PathBuf>, EnumerateError> {
    let root = if Path::new(glob_pattern).is_absolute() { "/" } else { "." };
    let mut pat = glob_pattern.to_string();
    if pat.starts_with("./") {
        pat = pat.trim_start_matches("./").to_string();
    }
    let no_files = || EnumerateError::NoFilesFound { pattern: glob_pattern.to_string() };
    let mut paths: Vec<PathBuf> = GlobWalkerBuilder::from_patterns(root, &[pat.as_str()])
        .case_insensitive(true)
        .follow_links(false)
        .build()
        .map_err(|_| no_files())?
        .filter_map(|e| e.ok())
        .map(|e| e.path().to_path_buf())
        .collect();

    paths.retain(|p| p.is_file());
    paths.sort();

    if paths.is_empty() {
        return Err(no_files());
    }
    Ok(paths)
}
