//! Input checks that run before any store call
//!
//! Failures here become the `Invalid` outcome of the workflow that asked;
//! they are expected results, not errors.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Why an input was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{0} must be a valid number")]
    NotANumber(&'static str),

    #[error("{0} must be a valid date")]
    InvalidDate(&'static str),

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("please confirm to delete your account")]
    NotConfirmed,
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Trimmed, non-empty text
pub fn required<'a>(field: &'static str, value: &'a str) -> ValidationResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed)
    }
}

/// A strictly positive, finite number
pub fn positive(field: &'static str, value: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        Err(ValidationError::NotANumber(field))
    } else if value <= 0.0 {
        Err(ValidationError::NotPositive(field))
    } else {
        Ok(value)
    }
}

/// A finite number that is zero or more
pub fn non_negative(field: &'static str, value: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        Err(ValidationError::NotANumber(field))
    } else if value < 0.0 {
        Err(ValidationError::Negative(field))
    } else {
        Ok(value)
    }
}

/// Parse a number typed into a form field
pub fn parse_number(field: &'static str, raw: &str) -> ValidationResult<f64> {
    required(field, raw)?
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber(field))
}

/// Parse a whole number typed into a form field
pub fn parse_count(field: &'static str, raw: &str) -> ValidationResult<i32> {
    required(field, raw)?
        .parse::<i32>()
        .map_err(|_| ValidationError::NotANumber(field))
}

/// Parse `YYYY-MM-DD`
pub fn parse_date(field: &'static str, raw: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(required(field, raw)?, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(field))
}

/// Parse the `datetime-local` layouts browsers send (`YYYY-MM-DDTHH:MM`,
/// optionally with seconds, or a space instead of `T`)
pub fn parse_datetime(field: &'static str, raw: &str) -> ValidationResult<NaiveDateTime> {
    let raw = required(field, raw)?;
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or(ValidationError::InvalidDate(field))
}

/// One `@` with something on both sides and a dot in the domain
pub fn email(value: &str) -> ValidationResult<&str> {
    let value = required("email", value)?;
    match value.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.') =>
        {
            Ok(value)
        }
        _ => Err(ValidationError::InvalidEmail),
    }
}
