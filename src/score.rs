use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::keys::DEFAULT_IDENTITY_FIELDS;
use crate::normalize::NormalizedFieldSet;
use crate::rut::is_valid_rut;
use crate::specs::FieldSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub ok_count: u32,
    pub invalid_count: u32,
    pub percentage: u32,
}

impl ComplianceResult {
    /// `round(ok / (ok + invalid) * 100)`, or 0 when nothing was evaluated.
    pub fn from_counts(ok_count: u32, invalid_count: u32) -> Self {
        let total = ok_count + invalid_count;
        let percentage = if total == 0 {
            0
        } else {
            (f64::from(ok_count) / f64::from(total) * 100.0).round() as u32
        };
        Self { ok_count, invalid_count, percentage }
    }
}

impl Add for ComplianceResult {
    type Output = ComplianceResult;

    fn add(self, rhs: Self) -> Self {
        Self::from_counts(self.ok_count + rhs.ok_count, self.invalid_count + rhs.invalid_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringOptions {
    /// Keys re-validated with the RUT checksum.
    #[serde(default = "default_identity_fields")]
    pub identity_fields: Vec<String>,
}

fn default_identity_fields() -> Vec<String> {
    DEFAULT_IDENTITY_FIELDS.iter().map(|s| s.to_string()).collect()
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self { identity_fields: default_identity_fields() }
    }
}

/// Per-document and per-dossier compliance percentages.
#[derive(Debug, Clone, Default)]
pub struct ComplianceScorer {
    options: ScoringOptions,
}

impl ComplianceScorer {
    pub fn new(options: ScoringOptions) -> Self {
        Self { options }
    }

    fn is_identity(&self, key: &str) -> bool {
        self.options.identity_fields.iter().any(|k| k == key)
    }

    fn counts_ok(&self, key: &str, value: &str) -> bool {
        !self.is_identity(key) || is_valid_rut(value)
    }

    pub fn score(&self, fields: &NormalizedFieldSet) -> ComplianceResult {
        let (mut ok, mut invalid) = (0u32, 0u32);
        for (key, value) in &fields.values {
            if self.counts_ok(key, value) {
                ok += 1;
            } else {
                invalid += 1;
            }
        }
        ComplianceResult::from_counts(ok, invalid)
    }

    /// Score a flat JSON object of extracted values. Arrays and objects are
    /// neither ok nor invalid.
    pub fn score_json(&self, values: &serde_json::Map<String, serde_json::Value>) -> ComplianceResult {
        let (mut ok, mut invalid) = (0u32, 0u32);
        for (key, value) in values {
            let text = match value {
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => continue,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if self.counts_ok(key, &text) {
                ok += 1;
            } else {
                invalid += 1;
            }
        }
        ComplianceResult::from_counts(ok, invalid)
    }

    /// Sum of ok/invalid over every document of a dossier.
    pub fn score_dossier<'a, I>(&self, documents: I) -> ComplianceResult
    where
        I: IntoIterator<Item = &'a NormalizedFieldSet>,
    {
        documents.into_iter().map(|d| self.score(d)).fold(ComplianceResult::default(), Add::add)
    }
}

/// How many of a document type's required fields were detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredCoverage {
    pub required: u32,
    pub missing: Vec<String>,
    pub percentage: u32,
}

/// 100 when nothing is required.
pub fn required_coverage(specs: &[FieldSpec], fields: &NormalizedFieldSet) -> RequiredCoverage {
    let required: Vec<&FieldSpec> = specs.iter().filter(|s| s.is_required).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|s| !fields.has_value(&s.field_key))
        .map(|s| s.field_key.clone())
        .collect();
    let total = required.len() as u32;
    let percentage = if total == 0 {
        100
    } else {
        let found = total - missing.len() as u32;
        (f64::from(found) / f64::from(total) * 100.0).round() as u32
    };
    RequiredCoverage { required: total, missing, percentage }
}
