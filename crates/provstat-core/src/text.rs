// crates/provstat-core/src/text.rs

//! Text normalization shared by every loader.

/// Fixed substitutions applied to every province name after uppercasing.
///
/// Order matters: the police-district name is rewritten before the
/// abbreviation is expanded.
pub const PROVINCE_SUBSTITUTIONS: &[(&str, &str)] =
    &[("METRO JAYA", "DKI JAKARTA"), ("KEP.", "KEPULAUAN")];

/// Convert a string into a folded key suitable for comparison.
///
/// This performs:
/// 1\) Transliterate Unicode → ASCII
/// 2\) Normalize to lowercase
/// 3\) Collapse runs of whitespace into one space
///
/// # Examples
///
/// ```rust
/// use provstat_core::text::fold_key;
///
/// assert_eq!(fold_key("  Kepulauan   Riau "), "kepulauan riau");
/// assert_eq!(fold_key("Bali & Nusa Tenggara"), "bali & nusa tenggara");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compares two strings for equality after folding.
pub fn equals_folded(a: &str, b: &str) -> bool {
    fold_key(a) == fold_key(b)
}

/// Canonical spelling of a province name.
///
/// Uppercases, trims and applies [`PROVINCE_SUBSTITUTIONS`].
///
/// ```rust
/// use provstat_core::text::canonical_province;
///
/// assert_eq!(canonical_province(" kep. riau"), "KEPULAUAN RIAU");
/// assert_eq!(canonical_province("METRO JAYA"), "DKI JAKARTA");
/// ```
pub fn canonical_province(raw: &str) -> String {
    let mut name = raw.trim().to_uppercase();
    for (from, to) in PROVINCE_SUBSTITUTIONS {
        if name.contains(from) {
            name = name.replace(from, to);
        }
    }
    name
}

/// Parses a number written with either decimal convention.
///
/// - Spaces are removed (`"2 345 678"` → `2345678`).
/// - With both `,` and `.` present, whichever comes first is the
///   thousands separator (`"1,234.5"` and `"1.234,5"` are both `1234.5`).
/// - A lone `,` is a decimal comma (`"6,5"` → `6.5`).
///
/// Returns `None` if the result still does not parse.
///
/// ```rust
/// use provstat_core::text::standardize_number;
///
/// assert_eq!(standardize_number("1.234,5"), Some(1234.5));
/// assert_eq!(standardize_number("-"), None);
/// ```
pub fn standardize_number(raw: &str) -> Option<f64> {
    let mut value: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if value.is_empty() {
        return None;
    }
    match (value.find(','), value.find('.')) {
        (Some(comma), Some(dot)) if comma < dot => {
            value = value.replace(',', "");
        }
        (Some(_), Some(_)) => {
            value = value.replace('.', "").replace(',', ".");
        }
        (Some(_), None) => {
            value = value.replace(',', ".");
        }
        _ => {}
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a four-digit year column label such as `"2016"`.
pub fn parse_year(s: &str) -> Option<u16> {
    let s = s.trim();
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_province_expands_abbreviations() {
        assert_eq!(canonical_province("Kep. Bangka Belitung"), "KEPULAUAN BANGKA BELITUNG");
        assert_eq!(canonical_province("  aceh  "), "ACEH");
        assert!(!canonical_province("KEP. RIAU").contains("KEP."));
    }

    #[test]
    fn canonical_province_maps_police_district() {
        assert_eq!(canonical_province("Metro Jaya"), "DKI JAKARTA");
    }

    #[test]
    fn standardize_number_handles_both_conventions() {
        assert_eq!(standardize_number("1,234.5"), Some(1234.5));
        assert_eq!(standardize_number("1.234,5"), Some(1234.5));
        assert_eq!(standardize_number("6,5"), Some(6.5));
        assert_eq!(standardize_number(" 2 345 678 "), Some(2_345_678.0));
        assert_eq!(standardize_number("95"), Some(95.0));
    }

    #[test]
    fn standardize_number_rejects_garbage() {
        assert_eq!(standardize_number(""), None);
        assert_eq!(standardize_number("…"), None);
        assert_eq!(standardize_number("ACEH"), None);
        assert_eq!(standardize_number("NaN"), None);
    }

    #[test]
    fn parse_year_only_accepts_four_digits() {
        assert_eq!(parse_year("2012"), Some(2012));
        assert_eq!(parse_year("Provinsi"), None);
        assert_eq!(parse_year("20123"), None);
    }

    #[test]
    fn folded_comparison_ignores_case_and_spacing() {
        assert!(equals_folded("Jawa  Barat", "JAWA BARAT"));
        assert!(!equals_folded("Jawa Barat", "Jawa Timur"));
    }
}
