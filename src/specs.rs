use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{read_rows, SourceError};
use crate::formats::{is_iso_date, looks_like_money, matches_spec_pattern};
use crate::layout::LayoutItem;
use crate::normalize::NormalizedFieldSet;
use crate::rut::is_valid_rut;
use crate::text::normalize_name;

/// Value kinds a field spec can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Rut,
    Date,
    Money,
    Integer,
    String,
}

impl Datatype {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rut" => Some(Self::Rut),
            "date" => Some(Self::Date),
            "money" => Some(Self::Money),
            "integer" | "int" => Some(Self::Integer),
            "string" | "text" => Some(Self::String),
            _ => None,
        }
    }
}

// catalog rows carry free text; unknown kinds mean "no datatype"
fn lenient_datatype<'de, D>(deserializer: D) -> Result<Option<Datatype>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Datatype::from_label))
}

/// Required-field rule for one document type, unique per (doc_type, field_key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    pub doc_type: String,
    pub field_key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, deserialize_with = "lenient_datatype")]
    pub datatype: Option<Datatype>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub suggestion_template: Option<String>,
    #[serde(default)]
    pub example_text: Option<String>,
}

impl FieldSpec {
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.field_key
        } else {
            &self.label
        }
    }

    fn pattern(&self) -> Option<&str> {
        self.regex.as_deref().filter(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Missing,
    Format,
}

/// One validation finding. Immutable once emitted; a review workflow
/// downstream assigns its disposition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub field_key: String,
    pub issue_type: IssueType,
    pub message: String,
    pub evidence: Option<Vec<LayoutItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Provider of field specs per document type.
pub trait SpecSource: Send + Sync {
    fn specs_for(&self, doc_type: &str) -> Result<Vec<FieldSpec>, SourceError>;
}

fn same_doc_type(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

#[derive(Debug, Clone, Default)]
pub struct StaticSpecSource(pub Vec<FieldSpec>);

impl SpecSource for StaticSpecSource {
    fn specs_for(&self, doc_type: &str) -> Result<Vec<FieldSpec>, SourceError> {
        Ok(self.0.iter().filter(|s| same_doc_type(&s.doc_type, doc_type)).cloned().collect())
    }
}

#[derive(Debug, Clone)]
pub struct FileSpecSource {
    pub path: PathBuf,
}

impl FileSpecSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SpecSource for FileSpecSource {
    fn specs_for(&self, doc_type: &str) -> Result<Vec<FieldSpec>, SourceError> {
        let rows: Vec<FieldSpec> = read_rows(&self.path)?;
        Ok(rows.into_iter().filter(|s| same_doc_type(&s.doc_type, doc_type)).collect())
    }
}

/// Compares a normalized field set against the specs of its document type.
pub struct SpecMatcher<'a> {
    source: &'a dyn SpecSource,
}

impl<'a> SpecMatcher<'a> {
    pub fn new(source: &'a dyn SpecSource) -> Self {
        Self { source }
    }

    /// Specs for `doc_type`, first row winning on duplicate keys. An
    /// unreachable source means no specs.
    pub fn load(&self, doc_type: &str) -> Vec<FieldSpec> {
        let rows = match self.source.specs_for(doc_type) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(doc_type, error = %e, "spec source unavailable; skipping validation");
                return Vec::new();
            }
        };
        let mut seen = HashSet::new();
        rows.into_iter().filter(|s| seen.insert(s.field_key.clone())).collect()
    }

    pub fn validate(&self, doc_type: &str, fields: &NormalizedFieldSet) -> Vec<Issue> {
        check_specs(&self.load(doc_type), fields)
    }
}

/// One MISSING issue per absent required field, one FORMAT issue per present
/// field failing its check, in spec order.
pub fn check_specs(specs: &[FieldSpec], fields: &NormalizedFieldSet) -> Vec<Issue> {
    let mut issues = Vec::new();
    for spec in specs {
        let key = spec.field_key.as_str();
        let label = spec.display_label();
        let evidence = fields.evidence_for(key).map(<[LayoutItem]>::to_vec);

        let value = match fields.get(key).filter(|v| !v.trim().is_empty()) {
            Some(v) => v,
            None => {
                if spec.is_required {
                    issues.push(Issue {
                        field_key: key.to_string(),
                        issue_type: IssueType::Missing,
                        message: format!("Missing required field: {}.", label),
                        evidence,
                        suggestion: spec.suggestion_template.clone(),
                    });
                }
                continue;
            }
        };

        if let Some(message) = format_failure(spec, label, value) {
            issues.push(Issue {
                field_key: key.to_string(),
                issue_type: IssueType::Format,
                message,
                evidence,
                suggestion: spec.suggestion_template.clone(),
            });
        }
    }
    issues
}

fn format_failure(spec: &FieldSpec, label: &str, value: &str) -> Option<String> {
    if let Some(pattern) = spec.pattern() {
        return (!matches_spec_pattern(pattern, value))
            .then(|| format!("{} does not match the expected format.", label));
    }
    match spec.datatype? {
        Datatype::Rut => (!is_valid_rut(value)).then(|| format!("{} is not a valid RUT.", label)),
        Datatype::Date => (!is_iso_date(value)).then(|| format!("{} must be YYYY-MM-DD.", label)),
        Datatype::Money => {
            (!looks_like_money(value)).then(|| format!("{} does not look like a valid amount.", label))
        }
        Datatype::Integer | Datatype::String => None,
    }
}
