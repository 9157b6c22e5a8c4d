//! Cell-level interpretation of tabular text values.

/// Parse a cell as a number.
///
/// A cell is numeric iff its trimmed text is non-empty and parses to a finite
/// `f64`. Blank cells are never treated as zero.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `"true"` in any case, surrounding whitespace ignored.
pub fn parse_bool(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}
