//! Check digit arithmetic for the Chilean tax identifier (RUT).
//!
//! A RUT is a numeric body followed by a declared check digit (`0-9` or `K`).
//! Punctuation is irrelevant: `12.345.678-5`, `12345678-5` and `123456785`
//! all denote the same identifier.

/// Keep only digits and `K`, uppercased.
pub fn clean_rut(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'k' || *c == 'K')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Compute the check digit for a numeric body. Returns `None` when the body
/// is empty or contains anything other than ASCII digits.
pub fn check_digit(body: &str) -> Option<char> {
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut sum: u64 = 0;
    let mut weight: u64 = 2;
    for c in body.chars().rev() {
        sum += u64::from(c.to_digit(10)?) * weight;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }
    Some(match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d as u32, 10)?,
    })
}

/// True iff the declared check digit matches the one computed from the body.
/// Malformed input (too short, `K` inside the body) is invalid, never an error.
pub fn is_valid_rut(raw: &str) -> bool {
    match split_rut(raw) {
        Some((body, declared)) => check_digit(&body) == Some(declared),
        None => false,
    }
}

/// Canonical `BODY-DV` rendering, e.g. `12.345.678-5` -> `12345678-5`.
pub fn format_rut(raw: &str) -> Option<String> {
    split_rut(raw).map(|(body, dv)| format!("{}-{}", body, dv))
}

fn split_rut(raw: &str) -> Option<(String, char)> {
    let clean = clean_rut(raw);
    let declared = clean.chars().last()?;
    let body = &clean[..clean.len() - declared.len_utf8()];
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((body.to_string(), declared))
}
