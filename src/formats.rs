use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

// $1.234.567,89 / $ 1.234.567 / 1.234.567 CLP / OCR trailing period; ASCII digits only
static RE_MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$?[ \t]?[0-9]{1,3}(?:\.[0-9]{3})*(?:,[0-9]{1,2})?(?:[ \t]*CLP)?\.?$").unwrap()
});
static RE_DMY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})[/\-]([0-9]{2})[/\-]([0-9]{4})$").unwrap());
static RE_ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
static RE_DATE_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9]{2}[/\-][0-9]{2}[/\-][0-9]{4}\b|\b[0-9]{4}-[0-9]{2}-[0-9]{2}\b").unwrap()
});
static RE_RUT_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]{1,2}\.?[0-9]{3}\.?[0-9]{3}-[0-9Kk]\b").unwrap());

pub fn looks_like_money(value: &str) -> bool {
    RE_MONEY.is_match(value.trim())
}

/// Drop the currency suffix, inner spaces and a trailing OCR period.
pub fn sanitize_money(value: &str) -> String {
    let v = value.trim().replace(" CLP", "").replace("CLP", "").replace(' ', "");
    v.trim_end_matches('.').to_string()
}

/// `DD/MM/YYYY` or `DD-MM-YYYY` becomes `YYYY-MM-DD`; anything else is
/// returned trimmed but otherwise untouched.
pub fn normalize_date(value: &str) -> String {
    let v = value.trim();
    match RE_DMY.captures(v) {
        Some(c) => format!("{}-{}-{}", &c[3], &c[2], &c[1]),
        None => v.to_string(),
    }
}

pub fn is_iso_date(value: &str) -> bool {
    RE_ISO_DATE.is_match(value)
}

/// First date-shaped substring of free text, already in ISO form.
pub fn find_date(text: &str) -> Option<String> {
    RE_DATE_IN_TEXT.find(text).map(|m| normalize_date(m.as_str()))
}

/// Grouped digits followed by a dash and a check character, anywhere in text.
pub fn contains_rut(text: &str) -> bool {
    RE_RUT_IN_TEXT.is_match(text)
}

/// Compile a catalog-supplied pattern case-insensitively. `None` means the
/// pattern is unusable.
pub fn compile_spec_pattern(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern).case_insensitive(true).build().ok()
}

/// A pattern that fails to compile never matches.
pub fn matches_spec_pattern(pattern: &str, value: &str) -> bool {
    match compile_spec_pattern(pattern) {
        Some(re) => re.is_match(value),
        None => {
            tracing::warn!(pattern, "spec regex does not compile; treating as no match");
            false
        }
    }
}
