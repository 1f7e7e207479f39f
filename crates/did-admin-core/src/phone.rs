//! Phone-number normalization.
//!
//! Raw numbers arrive from CSV uploads and forms in many shapes
//! (`tel:+1-212-555-0100`, `(212) 555-0100`, `2125550100`). Everything is
//! reduced to the canonical 11-digit North American form `1NXXNXXXXXX`
//! where possible. Malformed input never errors: the normalizer degrades
//! to returning whatever digits it found, and area-code extraction
//! degrades to an empty string.

/// Canonicalize a raw phone number.
///
/// - A leading `tel:` scheme (any case) is removed.
/// - All non-digit characters are dropped.
/// - 11 digits starting with `1` are returned as-is.
/// - 10 digits get a `1` prefix.
/// - More than 11 digits keep the last 10 with a `1` prefix.
/// - Anything else is returned as the bare digits.
///
/// # Examples
///
/// ```
/// use did_admin_core::phone::normalize;
///
/// assert_eq!(normalize("tel:+1-212-555-0100"), "12125550100");
/// assert_eq!(normalize("2125550100"), "12125550100");
/// assert_eq!(normalize("555"), "555");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = match trimmed.get(..4) {
        Some(scheme) if scheme.eq_ignore_ascii_case("tel:") => &trimmed[4..],
        _ => trimmed,
    };

    let digits: String = without_scheme
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    match digits.len() {
        11 if digits.starts_with('1') => digits,
        10 => format!("1{digits}"),
        n if n > 11 => format!("1{}", &digits[n - 10..]),
        _ => digits,
    }
}

/// Extract the 3-digit area code from a raw phone number.
///
/// The input is normalized first. Returns an empty string when the
/// number is too short to carry an area code.
#[must_use]
pub fn area_code(raw: &str) -> String {
    let normalized = normalize(raw);
    match normalized.len() {
        11 if normalized.starts_with('1') => normalized[1..4].to_string(),
        10 => normalized[..3].to_string(),
        _ => String::new(),
    }
}

/// Key used to match a DID against DialB spam records.
///
/// Digits only, with the leading country code removed from 11-digit
/// numbers, so `+1 (212) 555-0100` and `212.555.0100` share a key.
#[must_use]
pub fn dialb_match_key(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_tel_scheme_and_punctuation() {
        assert_eq!(normalize("tel:+1-212-555-0100"), "12125550100");
        assert_eq!(normalize("TEL:2125550100"), "12125550100");
        assert_eq!(normalize("(212) 555-0100"), "12125550100");
    }

    #[test]
    fn normalize_prefixes_ten_digit_numbers() {
        assert_eq!(normalize("2125550100"), "12125550100");
    }

    #[test]
    fn normalize_keeps_last_ten_of_long_numbers() {
        assert_eq!(normalize("15552125550100"), "12125550100");
        assert_eq!(normalize("0044 212 555 0100"), "12125550100");
    }

    #[test]
    fn normalize_degrades_on_short_or_odd_input() {
        assert_eq!(normalize("555"), "555");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("abc"), "");
        assert_eq!(normalize("22125550100"), "22125550100");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["tel:+1-212-555-0100", "2125550100", "555", "15552125550100"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn area_code_extraction() {
        assert_eq!(area_code("12125550100"), "212");
        assert_eq!(area_code("2125550100"), "212");
        assert_eq!(area_code("+1 (415) 555-0000"), "415");
        assert_eq!(area_code("555"), "");
        assert_eq!(area_code(""), "");
    }

    #[test]
    fn dialb_key_strips_country_code() {
        assert_eq!(dialb_match_key("+1 (212) 555-0100"), "2125550100");
        assert_eq!(dialb_match_key("212.555.0100"), "2125550100");
        assert_eq!(dialb_match_key("555"), "555");
    }
}
