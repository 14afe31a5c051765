//! # Value Transforms
//!
//! The closed set of normalizations a rule may name in
//! `transformFunction`. Each is a pure `&str -> String` function; stored
//! data selects one by tag and never supplies code.
//!
//! Transforms run after validation. A failure is reported to the caller,
//! who keeps the original value.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use shipcomply_core::{normalize_country, TransformKind};

use crate::error::TransformError;

/// Date layouts accepted by `normalizeDateISO`, tried in order. Slash dates
/// are read month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn dimensions_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(
        &RE,
        r"^\s*(\d+(?:\.\d+)?)\s*[xX×*]\s*(\d+(?:\.\d+)?)\s*[xX×*]\s*(\d+(?:\.\d+)?)\s*([A-Za-z]+)?\s*$",
    )
}

fn weight_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"^\s*(\d+(?:\.\d+)?)\s*([A-Za-z]+)\s*$")
}

/// Apply `kind` to `value`.
pub fn apply(kind: TransformKind, value: &str) -> Result<String, TransformError> {
    let unrecognized = || TransformError::Unrecognized {
        transform: kind,
        value: value.to_string(),
    };

    match kind {
        TransformKind::Trim => Ok(value.trim().to_string()),
        TransformKind::Uppercase => Ok(value.trim().to_uppercase()),
        TransformKind::Lowercase => Ok(value.trim().to_lowercase()),
        TransformKind::Uppercase2LetterCode => {
            let code = normalize_country(value);
            if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
                Ok(code)
            } else {
                Err(unrecognized())
            }
        }
        TransformKind::NormalizeDateIso => normalize_date(value).ok_or_else(unrecognized),
        TransformKind::NormalizeDimensions => {
            let caps = dimensions_re()
                .and_then(|re| re.captures(value))
                .ok_or_else(unrecognized)?;
            let mut out = format!("{} x {} x {}", &caps[1], &caps[2], &caps[3]);
            if let Some(unit) = caps.get(4) {
                out.push(' ');
                out.push_str(&unit.as_str().to_lowercase());
            }
            Ok(out)
        }
        TransformKind::NormalizeWeight => {
            let caps = weight_re()
                .and_then(|re| re.captures(value))
                .ok_or_else(unrecognized)?;
            Ok(format!("{} {}", &caps[1], caps[2].to_lowercase()))
        }
        TransformKind::DigitsOnly => {
            let digits: String = value.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                Err(unrecognized())
            } else {
                Ok(digits)
            }
        }
        TransformKind::Custom => Err(TransformError::Reserved),
    }
}

fn normalize_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_transforms_trim() {
        assert_eq!(apply(TransformKind::Trim, "  DHL ").unwrap(), "DHL");
        assert_eq!(apply(TransformKind::Uppercase, " eur").unwrap(), "EUR");
        assert_eq!(apply(TransformKind::Lowercase, "Box ").unwrap(), "box");
    }

    #[test]
    fn test_country_code_transform() {
        assert_eq!(
            apply(TransformKind::Uppercase2LetterCode, "Germany").unwrap(),
            "DE"
        );
        assert_eq!(apply(TransformKind::Uppercase2LetterCode, "us").unwrap(), "US");
        assert!(apply(TransformKind::Uppercase2LetterCode, "Atlantis").is_err());
    }

    #[test]
    fn test_dates_normalize_to_iso() {
        for input in [
            "2024-03-05",
            "2024/03/05",
            "03/05/2024",
            "05.03.2024",
            "March 5, 2024",
            "5 Mar 2024",
            "2024-03-05T10:00:00Z",
        ] {
            assert_eq!(
                apply(TransformKind::NormalizeDateIso, input).unwrap(),
                "2024-03-05",
                "input {input}"
            );
        }
        assert!(apply(TransformKind::NormalizeDateIso, "next tuesday").is_err());
    }

    #[test]
    fn test_dimensions_and_weight() {
        assert_eq!(
            apply(TransformKind::NormalizeDimensions, "30x20x10 CM").unwrap(),
            "30 x 20 x 10 cm"
        );
        assert_eq!(
            apply(TransformKind::NormalizeDimensions, "12.5 X 4 X 3").unwrap(),
            "12.5 x 4 x 3"
        );
        assert_eq!(apply(TransformKind::NormalizeWeight, "2.5KG").unwrap(), "2.5 kg");
        assert!(apply(TransformKind::NormalizeWeight, "heavy").is_err());
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(
            apply(TransformKind::DigitsOnly, "8471.30.01").unwrap(),
            "84713001"
        );
        assert!(apply(TransformKind::DigitsOnly, "n/a").is_err());
    }

    #[test]
    fn test_custom_is_reserved() {
        assert_eq!(
            apply(TransformKind::Custom, "anything"),
            Err(TransformError::Reserved)
        );
    }
}
