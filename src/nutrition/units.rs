//! Serving-size parsing
//!
//! The calorie API reports a serving size as a free-form string such as
//! "150 g", "1 cup" or occasionally "150g". Only the leading number and the
//! unit token matter for scaling.

/// The only unit treated as a gram weight
pub const GRAM_UNIT: &str = "g";

/// Basis (in grams) assumed when no usable gram serving size is available
pub const FALLBACK_BASIS_GRAMS: f64 = 100.0;

/// A serving-size string split into number and unit
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedServingSize {
    /// Leading number, if one could be read
    pub quantity: Option<f64>,
    /// Lower-cased unit token, empty when absent
    pub unit: String,
}

impl ParsedServingSize {
    pub fn is_grams(&self) -> bool {
        self.unit == GRAM_UNIT
    }

    /// The quantity when it is a usable positive number
    pub fn usable_quantity(&self) -> Option<f64> {
        self.quantity.filter(|q| q.is_finite() && *q > 0.0)
    }
}

/// Read the longest numeric prefix of `s`, returning the value and the rest.
///
/// Accepts an optional sign, digits with an optional fractional part and an
/// optional exponent. Leading whitespace is skipped.
pub fn parse_leading_number(s: &str) -> Option<(f64, &str)> {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if end < len && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < len && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if has_digits || j > frac_start {
            has_digits = true;
            end = j;
        }
    }

    if !has_digits {
        return None;
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .map(|value| (value, &trimmed[end..]))
}

/// Parse a serving-size string of the form `"<number> <unit>"`.
///
/// The unit is only ever the second whitespace token. "150g" has no unit
/// token, so its unit is empty.
pub fn parse_serving_size(serving_size: &str) -> ParsedServingSize {
    let mut tokens = serving_size.split_whitespace();
    let quantity = tokens
        .next()
        .and_then(parse_leading_number)
        .map(|(value, _)| value);
    let unit = tokens.next().map(str::to_lowercase).unwrap_or_default();

    ParsedServingSize { quantity, unit }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("150"), Some((150.0, "")));
        assert_eq!(parse_leading_number("12.5g"), Some((12.5, "g")));
        assert_eq!(parse_leading_number(".5 cup"), Some((0.5, " cup")));
        assert_eq!(parse_leading_number("1e2x"), Some((100.0, "x")));
        assert_eq!(parse_leading_number("3e"), Some((3.0, "e")));
        assert_eq!(parse_leading_number("cup"), None);
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("-"), None);
    }

    #[test]
    fn test_parse_serving_size_with_space() {
        let parsed = parse_serving_size("150 g");
        assert_eq!(parsed.quantity, Some(150.0));
        assert_eq!(parsed.unit, "g");
        assert!(parsed.is_grams());
    }

    #[test]
    fn test_parse_serving_size_is_case_insensitive() {
        let parsed = parse_serving_size("240 ML");
        assert_eq!(parsed.unit, "ml");
        assert!(!parsed.is_grams());
        assert!(parse_serving_size("100 G").is_grams());
    }

    #[test]
    fn test_parse_serving_size_attached_unit() {
        let parsed = parse_serving_size("150g");
        assert_eq!(parsed.quantity, Some(150.0));
        assert_eq!(parsed.unit, "");
        assert!(!parsed.is_grams());
    }

    #[test]
    fn test_parse_serving_size_malformed() {
        let parsed = parse_serving_size("about g");
        assert_eq!(parsed.quantity, None);
        assert!(parsed.is_grams());
        assert_eq!(parsed.usable_quantity(), None);

        let empty = parse_serving_size("");
        assert_eq!(empty.quantity, None);
        assert_eq!(empty.unit, "");
    }

    #[test]
    fn test_zero_quantity_is_not_usable() {
        assert_eq!(parse_serving_size("0 g").usable_quantity(), None);
        assert_eq!(parse_serving_size("85 g").usable_quantity(), Some(85.0));
    }
}
