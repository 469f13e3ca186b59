use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::catalog::{read_rows, SourceError};
use crate::keys;
use crate::text::{normalize_label, normalize_name, strip_error_suffix};

/// One label -> canonical key rule. `doc_type = None` is a generic rule.
/// Lower `priority` wins within the same scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasEntry {
    #[serde(default)]
    pub doc_type: Option<String>,
    pub normalized_label: String,
    pub field_key: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_priority() -> i32 {
    10
}

fn default_active() -> bool {
    true
}

/// Built-in generic labels, used when nothing else resolves.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("TIPO DOCUMENTO", keys::DOC_TYPE),
    ("TIPO DE DOCUMENTO", keys::DOC_TYPE),
    ("DOCUMENT TYPE", keys::DOC_TYPE),
    ("FECHA", keys::DATE),
    ("DATE", keys::DATE),
    ("NOMBRE COMPLETO", keys::NAME_ANY),
    ("NOMBRE", keys::NAME_ANY),
    ("NAME", keys::NAME_ANY),
    ("RUT", keys::ID_ANY),
    ("R U T", keys::ID_ANY),
    ("DIRECCION", keys::ADDRESS),
    ("DOMICILIO", keys::ADDRESS),
    ("ADDRESS", keys::ADDRESS),
    ("EMPRESA", keys::COMPANY_ANY),
    ("RAZON SOCIAL", keys::COMPANY_ANY),
    ("COMPANY", keys::COMPANY_ANY),
    ("MONTO", keys::TOTAL_AMOUNT),
    ("MONTO TOTAL", keys::TOTAL_AMOUNT),
    ("TOTAL", keys::TOTAL_AMOUNT),
    ("VALOR", keys::TOTAL_AMOUNT),
];

/// Provider of alias rows (database, catalog file, fixture).
pub trait AliasSource: Send + Sync {
    fn load(&self) -> Result<Vec<AliasEntry>, SourceError>;
}

/// In-memory rows.
#[derive(Debug, Clone, Default)]
pub struct StaticAliasSource(pub Vec<AliasEntry>);

impl AliasSource for StaticAliasSource {
    fn load(&self) -> Result<Vec<AliasEntry>, SourceError> {
        Ok(self.0.clone())
    }
}

/// Rows read from a YAML/JSON catalog file on every rebuild.
#[derive(Debug, Clone)]
pub struct FileAliasSource {
    pub path: PathBuf,
}

impl FileAliasSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AliasSource for FileAliasSource {
    fn load(&self) -> Result<Vec<AliasEntry>, SourceError> {
        read_rows(&self.path)
    }
}

/// Merged lookup table: defaults, then generic rows, then per-doc-type rows.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    generic: HashMap<String, String>,
    specific: HashMap<String, HashMap<String, String>>,
    degraded: bool,
}

impl AliasTable {
    /// Table holding only the built-in defaults.
    pub fn defaults() -> Self {
        let generic = DEFAULT_ALIASES
            .iter()
            .map(|(label, key)| (label.to_string(), key.to_string()))
            .collect();
        Self { generic, specific: HashMap::new(), degraded: false }
    }

    /// Merge rows over the defaults. Inactive rows are ignored; inside one
    /// scope the lowest priority number claims a label.
    pub fn from_entries(entries: &[AliasEntry]) -> Self {
        let mut rows: Vec<&AliasEntry> = entries.iter().filter(|e| e.active).collect();
        rows.sort_by_key(|e| e.priority);

        let mut generic: HashMap<String, String> = HashMap::new();
        let mut specific: HashMap<String, HashMap<String, String>> = HashMap::new();
        for row in rows {
            let label = normalize_label(&row.normalized_label);
            if label.is_empty() || row.field_key.trim().is_empty() {
                continue;
            }
            let scope = match row.doc_type.as_deref().map(normalize_name) {
                Some(dt) if !dt.is_empty() => specific.entry(dt).or_default(),
                _ => &mut generic,
            };
            scope.entry(label).or_insert_with(|| row.field_key.trim().to_string());
        }

        let mut table = Self::defaults();
        table.generic.extend(generic);
        table.specific = specific;
        table
    }

    /// True when the table was built without its source.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Resolve a raw extractor label. Doc-type rows take precedence over
    /// generic rows when `doc_type` is supplied.
    pub fn lookup(&self, raw_label: &str, doc_type: Option<&str>) -> Option<&str> {
        let label = normalize_label(strip_error_suffix(raw_label.trim()));
        if label.is_empty() {
            return None;
        }
        if let Some(dt) = doc_type.map(normalize_name) {
            if let Some(key) = self.specific.get(&dt).and_then(|m| m.get(&label)) {
                return Some(key.as_str());
            }
        }
        self.generic.get(&label).map(String::as_str)
    }
}

/// Time-bound holder of the last built table. Readers share one `Arc`;
/// any caller may rebuild on expiry and the last writer wins.
#[derive(Debug)]
pub struct AliasCache {
    ttl: Duration,
    slot: RwLock<Option<(Instant, Arc<AliasTable>)>>,
}

impl AliasCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: RwLock::new(None) }
    }

    /// Cache that is already filled; it still expires after `ttl`.
    pub fn prepopulated(ttl: Duration, table: AliasTable) -> Self {
        Self { ttl, slot: RwLock::new(Some((Instant::now(), Arc::new(table)))) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn fresh(&self) -> Option<Arc<AliasTable>> {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some((built, table)) if built.elapsed() < self.ttl => Some(Arc::clone(table)),
            _ => None,
        }
    }

    fn store(&self, table: AliasTable) -> Arc<AliasTable> {
        let table = Arc::new(table);
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some((Instant::now(), Arc::clone(&table)));
        table
    }

    pub fn invalidate(&self) {
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

impl Default for AliasCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

/// Label -> canonical key resolution backed by a source and a cache.
pub struct AliasResolver {
    source: Box<dyn AliasSource>,
    cache: AliasCache,
}

impl AliasResolver {
    pub fn new(source: Box<dyn AliasSource>, cache: AliasCache) -> Self {
        Self { source, cache }
    }

    /// Resolver without any external rows.
    pub fn defaults_only() -> Self {
        Self::new(Box::new(StaticAliasSource::default()), AliasCache::default())
    }

    /// Current table, rebuilt from the source when the cache has expired.
    /// An unreachable source yields the built-in defaults.
    pub fn table(&self) -> Arc<AliasTable> {
        if let Some(table) = self.cache.fresh() {
            return table;
        }
        let table = match self.source.load() {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "rebuilding alias table");
                AliasTable::from_entries(&rows)
            }
            Err(e) => {
                tracing::warn!(error = %e, "alias source unavailable; using built-in defaults");
                AliasTable { degraded: true, ..AliasTable::defaults() }
            }
        };
        self.cache.store(table)
    }

    pub fn resolve(&self, label: &str, doc_type: Option<&str>) -> Option<String> {
        self.table().lookup(label, doc_type).map(str::to_string)
    }

    pub fn cache(&self) -> &AliasCache {
        &self.cache
    }
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::defaults_only()
    }
}
