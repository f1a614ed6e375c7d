use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid number '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Error returned when a string is not a date in any accepted format.
#[derive(Debug, Error)]
#[error("invalid date '{0}', expected YYYY-MM-DD or MM/DD/YYYY")]
pub struct ParseDateError(String);

/// Formats accepted for dates typed by the user.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::warn!(input = %s, "invalid number: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a date typed by the user.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseDateError> {
    let trimmed = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ParseDateError(trimmed.to_string()))
}

/// Formats an optional date for display, using "—" when `None`.
pub fn opt_date_display(d: Option<NaiveDate>) -> String {
    d.map(|v| v.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("1,234,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_trim_whitespace() {
        assert_eq!(parse_decimal("  123.45  ").unwrap(), dec!(123.45));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn parse_date_accepts_iso_and_us_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(parse_date("2023-01-31").unwrap(), expected);
        assert_eq!(parse_date(" 01/31/2023 ").unwrap(), expected);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("31.01.2023").is_err());
        assert!(parse_date("2023-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn opt_date_display_uses_dash_for_missing() {
        assert_eq!(opt_date_display(NaiveDate::from_ymd_opt(2023, 1, 1)), "2023-01-01");
        assert_eq!(opt_date_display(None), "—");
    }
}
