use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aliases::{AliasResolver, AliasTable};
use crate::formats::{contains_rut, find_date, looks_like_money, normalize_date, sanitize_money};
use crate::keys;
use crate::layout::LayoutItem;
use crate::text::{normalize_label, strip_error_suffix};

/// Canonical field values of one document plus the layout items each value
/// came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedFieldSet {
    pub values: BTreeMap<String, String>,
    pub evidence: BTreeMap<String, Vec<LayoutItem>>,
}

impl NormalizedFieldSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Present means present and not blank.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).map(|v| !v.trim().is_empty()).unwrap_or(false)
    }

    pub fn evidence_for(&self, key: &str) -> Option<&[LayoutItem]> {
        self.evidence.get(key).map(Vec::as_slice).filter(|items| !items.is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First writer wins. Returns false if the key was already set.
    pub fn insert_first(&mut self, key: &str, value: String, source: &LayoutItem) -> bool {
        if self.values.contains_key(key) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        self.evidence.entry(key.to_string()).or_default().push(source.clone());
        true
    }
}

/// What happens to the third and later occurrences of a repeated entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Drop them.
    #[default]
    Discard,
    /// Keep them as `<first slot>_2`, `<first slot>_3`, ...
    Indexed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerOptions {
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

/// Form captions that OCR sometimes reads back as the value of their own
/// field, keyed by normalized label.
const PLACEHOLDERS: &[(&str, &[&str])] = &[
    ("GENERO", &["GENERO"]),
    ("NACIONALIDAD", &["NACIONALIDAD"]),
    ("MONTO", &["MONTO"]),
    ("MONEDA", &["MONEDA"]),
    ("CIUDAD", &["CIUDAD"]),
    ("DIRECCION", &["DIRECCION"]),
    ("RUT", &["RUT"]),
    ("RUT DEUDOR", &["RUT"]),
    ("RUT CORREDOR", &["RUT"]),
    ("EMPRESA", &["EMPRESA"]),
    ("EMPRESA DEUDOR", &["EMPRESA"]),
    ("EMPRESA CORREDOR", &["EMPRESA"]),
    ("NOMBRE COMPLETO", &["NOMBRE", "NOMBRE COMPLETO"]),
    ("NOMBRE COMPLETO DEUDOR", &["NOMBRE COMPLETO"]),
    ("NOMBRE COMPLETO CORREDOR", &["NOMBRE COMPLETO"]),
    ("TIPO DOCUMENTO", &["TIPO DOCUMENTO", "TIPO DE DOCUMENTO"]),
    ("ID REGISTRO", &["ID", "ID REGISTRO"]),
];

const CAPTION_PUNCT: &[char] = &[' ', ',', '.', ';', ':', '(', ')', '[', ']', '{', '}'];

/// True when `text` is only the caption of its own field, e.g. a `RUT` item
/// whose text reads "RUT:".
pub fn is_placeholder(label: &str, text: &str) -> bool {
    let text = normalize_label(text.trim_matches(CAPTION_PUNCT));
    if text.is_empty() {
        return false;
    }
    let label = normalize_label(strip_error_suffix(label.trim()));
    if text == label {
        return true;
    }
    PLACEHOLDERS
        .iter()
        .any(|(l, captions)| *l == label && captions.contains(&text.as_str()))
}

/// Collective buckets and the positional keys their entries are assigned to.
const BUCKET_SLOTS: &[(&str, &[&str])] = &[
    (keys::NAME_ANY, &[keys::ISSUER_NAME, keys::RECIPIENT_NAME]),
    (keys::ID_ANY, &[keys::ISSUER_ID, keys::RECIPIENT_ID]),
    (keys::COMPANY_ANY, &[keys::ISSUER_COMPANY]),
];

#[derive(Default)]
struct Buckets {
    names: Vec<LayoutItem>,
    ids: Vec<LayoutItem>,
    companies: Vec<LayoutItem>,
}

impl Buckets {
    fn get_mut(&mut self, key: &str) -> Option<&mut Vec<LayoutItem>> {
        match key {
            keys::NAME_ANY => Some(&mut self.names),
            keys::ID_ANY => Some(&mut self.ids),
            keys::COMPANY_ANY => Some(&mut self.companies),
            _ => None,
        }
    }

    fn get(&self, key: &str) -> &[LayoutItem] {
        match key {
            keys::NAME_ANY => self.names.as_slice(),
            keys::ID_ANY => self.ids.as_slice(),
            keys::COMPANY_ANY => self.companies.as_slice(),
            _ => &[],
        }
    }
}

/// Turns a document's layout items into a [`NormalizedFieldSet`].
pub struct FieldNormalizer<'a> {
    resolver: &'a AliasResolver,
    options: NormalizerOptions,
}

impl<'a> FieldNormalizer<'a> {
    pub fn new(resolver: &'a AliasResolver, options: NormalizerOptions) -> Self {
        Self { resolver, options }
    }

    /// One alias snapshot is used for the whole run.
    pub fn normalize(&self, items: &[LayoutItem], doc_type: Option<&str>) -> NormalizedFieldSet {
        let table = self.resolver.table();
        normalize_with_table(&table, items, doc_type, self.options)
    }
}

pub fn normalize_with_table(
    table: &AliasTable,
    items: &[LayoutItem],
    doc_type: Option<&str>,
    options: NormalizerOptions,
) -> NormalizedFieldSet {
    let mut set = NormalizedFieldSet::default();
    let mut buckets = Buckets::default();

    for raw in items {
        let text = raw.text.trim();
        if text.is_empty() {
            continue;
        }
        if is_placeholder(&raw.label, text) {
            tracing::debug!(label = %raw.label, "skipping caption read as a value");
            continue;
        }
        let item = LayoutItem { text: text.to_string(), ..raw.clone() };
        let label = strip_error_suffix(raw.label.trim());

        if let Some(key) = table.lookup(label, doc_type) {
            if let Some(bucket) = buckets.get_mut(key) {
                bucket.push(item);
                continue;
            }
            let value = match key {
                keys::TOTAL_AMOUNT => sanitize_money(text),
                keys::DATE => normalize_date(text),
                _ => text.to_string(),
            };
            set.insert_first(key, value, &item);
            continue;
        }

        // unknown label: fall back to the shape of the text
        if looks_like_money(text) {
            set.insert_first(keys::TOTAL_AMOUNT, sanitize_money(text), &item);
        }
        if let Some(date) = find_date(text) {
            set.insert_first(keys::DATE, date, &item);
        }
        if contains_rut(text) {
            buckets.ids.push(item);
        }
    }

    assign_positions(&mut set, &buckets, options.overflow);
    set
}

fn assign_positions(set: &mut NormalizedFieldSet, buckets: &Buckets, overflow: OverflowPolicy) {
    for (bucket_key, slots) in BUCKET_SLOTS {
        let entries = buckets.get(bucket_key);
        for (slot, item) in slots.iter().zip(entries) {
            set.insert_first(slot, item.text.clone(), item);
        }
        if overflow == OverflowPolicy::Indexed && entries.len() > slots.len() {
            for (n, item) in entries[slots.len()..].iter().enumerate() {
                let key = format!("{}_{}", slots[0], n + 2);
                set.insert_first(&key, item.text.clone(), item);
            }
        } else if entries.len() > slots.len() {
            tracing::debug!(
                bucket = *bucket_key,
                dropped = entries.len() - slots.len(),
                "discarding overflow entities"
            );
        }
    }
}
