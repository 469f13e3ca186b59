use std::collections::HashSet;
use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::{read_rows, SourceError};
use crate::text::normalize_name;

pub use crate::text::normalize_name as normalize;

const STOPWORD: &str = "DE";

/// Build the in-order word pattern for a canonical name. `None` when the
/// name has no usable words, which means it never matches.
pub fn compile_name_pattern(canonical_name: &str) -> Option<Regex> {
    let normalized = normalize_name(canonical_name);
    let words: Vec<String> = normalized
        .split_whitespace()
        .filter(|w| *w != STOPWORD)
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        return None;
    }
    Regex::new(&words.join(r"\s+(?:DE\s+)?")).ok()
}

/// Does the filename mention the canonical document name?
pub fn matches(filename: &str, canonical_name: &str) -> bool {
    match compile_name_pattern(canonical_name) {
        Some(re) => re.is_match(&normalize_name(filename)),
        None => false,
    }
}

/// A document a complete dossier must contain. `match_count` is reset at the
/// start of every evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MandatoryDocumentEntry {
    pub canonical_name: String,
    #[serde(default = "default_must_analyze")]
    pub must_analyze: bool,
    #[serde(default)]
    pub match_count: u32,
}

fn default_must_analyze() -> bool {
    true
}

impl MandatoryDocumentEntry {
    pub fn new(canonical_name: impl Into<String>, must_analyze: bool) -> Self {
        Self { canonical_name: canonical_name.into(), must_analyze, match_count: 0 }
    }

    pub fn is_pending(&self) -> bool {
        self.match_count == 0
    }
}

#[derive(Debug, Clone)]
struct CatalogSlot {
    entry: MandatoryDocumentEntry,
    pattern: Option<Regex>,
}

/// Filename classification result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub filename: String,
    pub canonical_name: String,
    pub must_analyze: bool,
}

/// Outcome of evaluating a batch of filenames against the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DossierOverview {
    pub to_analyze: Vec<Classification>,
    pub not_to_analyze: Vec<Classification>,
    pub unmatched: Vec<String>,
    pub pending: Vec<String>,
}

/// Mandatory documents, ordered longest name first, with patterns built once.
#[derive(Debug, Clone, Default)]
pub struct DocumentCatalog {
    slots: Vec<CatalogSlot>,
}

impl DocumentCatalog {
    /// Entries whose names normalize alike share one slot; the first row wins.
    pub fn new(entries: Vec<MandatoryDocumentEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut slots: Vec<CatalogSlot> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(normalize_name(&entry.canonical_name)) {
                tracing::debug!(name = %entry.canonical_name, "duplicate mandatory document merged");
                continue;
            }
            let pattern = compile_name_pattern(&entry.canonical_name);
            if pattern.is_none() {
                tracing::warn!(name = %entry.canonical_name, "canonical name has no matchable words");
            }
            slots.push(CatalogSlot { entry, pattern });
        }
        slots.sort_by_key(|s| std::cmp::Reverse(s.entry.canonical_name.chars().count()));
        Self { slots }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path: PathBuf = path.into();
        let rows: Vec<MandatoryDocumentEntry> = read_rows(&path)?;
        Ok(Self::new(rows))
    }

    pub fn entries(&self) -> impl Iterator<Item = &MandatoryDocumentEntry> {
        self.slots.iter().map(|s| &s.entry)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn winner(&self, filename: &str) -> Option<usize> {
        let normalized = normalize_name(filename);
        self.slots.iter().position(|s| match &s.pattern {
            Some(re) => re.is_match(&normalized),
            None => false,
        })
    }

    /// The most specific canonical entry the filename matches.
    pub fn classify(&self, filename: &str) -> Option<&MandatoryDocumentEntry> {
        self.winner(filename).map(|i| &self.slots[i].entry)
    }

    /// Classify a whole batch. Counters are reset first; an entry still at
    /// zero afterwards is reported as pending.
    pub fn evaluate<S: AsRef<str>>(&mut self, filenames: &[S]) -> DossierOverview {
        for slot in &mut self.slots {
            slot.entry.match_count = 0;
        }

        let mut overview = DossierOverview::default();
        for name in filenames {
            let filename = name.as_ref();
            let Some(i) = self.winner(filename) else {
                tracing::debug!(filename, "no mandatory document matches");
                overview.unmatched.push(filename.to_string());
                continue;
            };
            let entry = &mut self.slots[i].entry;
            entry.match_count += 1;
            let classification = Classification {
                filename: filename.to_string(),
                canonical_name: entry.canonical_name.clone(),
                must_analyze: entry.must_analyze,
            };
            if entry.must_analyze {
                overview.to_analyze.push(classification);
            } else {
                overview.not_to_analyze.push(classification);
            }
        }

        overview.pending = self
            .entries()
            .filter(|e| e.is_pending())
            .map(|e| e.canonical_name.clone())
            .collect();
        overview
    }
}
