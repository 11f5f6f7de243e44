//! Validation helpers
//!
//! Conversions from loosely-typed request values into domain types.

use chrono::{DateTime, NaiveDate};
use validator::ValidationError;

use crate::utils::errors::AppError;

/// Parse a calendar date given either as `YYYY-MM-DD` or as an RFC 3339 timestamp
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| {
            let mut error = ValidationError::new("date");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"YYYY-MM-DD or RFC3339".to_string());
            error
        })
}

/// Validate that a string is not blank
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Return the trimmed value, or `None` when absent or blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a date field of a request, reporting the field name on failure
pub fn parse_date_field(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    parse_date(value)
        .map_err(|_| AppError::ValidationError(format!("Invalid {}: '{}'", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(
            parse_date("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_parse_rfc3339_date() {
        assert_eq!(
            parse_date("2024-03-15T10:30:00Z").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_parse_invalid_date() {
        assert!(parse_date("15/03/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  abc ")), Some("abc"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
