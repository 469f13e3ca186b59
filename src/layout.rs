use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::rut::{clean_rut, format_rut, is_valid_rut};
use crate::text::strip_tagger_prefix;

// recognizers emit `null` for absent fields as often as they omit them
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One label/text/box extraction for a single field occurrence on one page.
/// Boxes are `[x1, y1, x2, y2]` in source-image pixel space; `page` is 0-based.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub boxes: Vec<[f64; 4]>,
    #[serde(default)]
    pub page: Option<u32>,
}

impl LayoutItem {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self { label: label.into(), text: text.into(), boxes: Vec::new(), page: None }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_box(mut self, b: [f64; 4]) -> Self {
        self.boxes.push(b);
        self
    }
}

/// Raw recognizer output for one page image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    /// Originating file, e.g. `contrato_p2.png`; used to infer the page index.
    pub source_name: String,
    pub json_layout: String,
}

/// Parse one page's layout JSON. Anything that is not an array counts as
/// zero items, and array elements that are not items are skipped.
pub fn parse_layout_json(raw: &str) -> Vec<LayoutItem> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(serde_json::Value::Array(values)) => values,
        Ok(_) => {
            tracing::warn!("layout json is not an array; treating as empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "malformed layout json; treating as empty");
            return Vec::new();
        }
    };
    values
        .into_iter()
        .filter_map(|v| serde_json::from_value::<LayoutItem>(v).ok())
        .collect()
}

static RE_PAGE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)_p([0-9]+)\.").unwrap());

/// `..._p1.png` -> 0, `..._p12.jpg` -> 11.
pub fn page_index_from_filename(name: &str) -> Option<u32> {
    let caps = RE_PAGE_SUFFIX.captures(name)?;
    let n: u32 = caps[1].parse().ok()?;
    Some(n.saturating_sub(1))
}

/// Concatenate every page of a document group, filling each item's missing
/// page from the filename suffix or, failing that, from ingestion order.
pub fn merge_page_layouts(pages: &[PageLayout]) -> Vec<LayoutItem> {
    let mut out = Vec::new();
    for (ordinal, page) in pages.iter().enumerate() {
        let index = page_index_from_filename(&page.source_name).unwrap_or(ordinal as u32);
        for mut item in parse_layout_json(&page.json_layout) {
            if item.page.is_none() {
                item.page = Some(index);
            }
            out.push(item);
        }
    }
    out
}

/// Rewrite identity-labelled items to `BODY-DV` and append the `_E` marker to
/// the label of those whose check digit is wrong. Returns how many items were
/// marked. Labels are compared without their tagger prefix.
pub fn mark_identity_errors(items: &mut [LayoutItem], identity_labels: &[String]) -> usize {
    let mut marked = 0usize;
    for item in items.iter_mut() {
        let label = strip_tagger_prefix(&item.label);
        if !identity_labels.iter().any(|l| l == label) {
            continue;
        }
        let clean = clean_rut(&item.text);
        if clean.len() < 2 {
            continue;
        }
        let valid = is_valid_rut(&item.text);
        // a K inside the body is not a RUT, but the text is still canonicalized
        item.text = format_rut(&item.text).unwrap_or_else(|| {
            let (body, dv) = clean.split_at(clean.len() - 1);
            format!("{}-{}", body, dv)
        });
        if !valid {
            item.label.push_str("_E");
            marked += 1;
        }
    }
    marked
}
