use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static RE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_.\-]+").unwrap());
static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Z0-9]+").unwrap());

/// Decompose to NFKD and drop everything that is not ASCII, so that
/// "Dirección" becomes "Direccion".
pub fn fold_ascii(s: &str) -> String {
    s.nfkd().filter(|c| c.is_ascii()).collect()
}

/// Collapse every whitespace run to one space and trim.
pub fn collapse_spaces(s: &str) -> String {
    RE_SPACES.replace_all(s.trim(), " ").trim().to_string()
}

/// Strip the upstream `_E` error marker from a raw label.
pub fn strip_error_suffix(label: &str) -> &str {
    label.strip_suffix("_E").unwrap_or(label)
}

/// Strip the `B-`/`I-` prefix a sequence tagger puts on entity labels.
pub fn strip_tagger_prefix(label: &str) -> &str {
    label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label)
}

/// Canonical form of an extractor label: tagger prefix dropped, ASCII,
/// uppercase, `_ . -` become spaces, whitespace collapsed.
pub fn normalize_label(raw: &str) -> String {
    let upper = fold_ascii(strip_tagger_prefix(raw.trim())).to_uppercase();
    let spaced = RE_SEPARATORS.replace_all(&upper, " ");
    collapse_spaces(&spaced)
}

/// Canonical form of a filename or document-type name: ASCII, uppercase,
/// every non-alphanumeric run becomes one space.
pub fn normalize_name(raw: &str) -> String {
    let upper = fold_ascii(raw).to_uppercase();
    let spaced = RE_NON_ALNUM.replace_all(&upper, " ");
    collapse_spaces(&spaced)
}
