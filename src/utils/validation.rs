//! Centralized field validation helpers.
//!
//! Every helper returns `Result<T, String>` where the error is the message
//! reported to the client for that field. [`FieldErrors`] collects those
//! messages per field so one response can report every offending field.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_NULL: &str = "This field may not be null.";
pub const MSG_INVALID_UUID: &str = "Must be a valid UUID.";
pub const MSG_INVALID_DATE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub const MSG_INVALID_NUMBER: &str = "A valid number is required.";
pub const MSG_INVALID_INTEGER: &str = "A valid integer is required.";

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Unwrap a field check, recording its message on failure
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded for one field
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Names of every field with at least one message
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Deserialize a field that distinguishes an absent key from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: a missing key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(value))`.
///
/// # Errors
///
/// Propagates the inner deserializer's error for a wrongly typed value.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Fail when a required value is missing
///
/// # Errors
///
/// Returns the "required" message for `None`.
pub fn required<T>(value: Option<T>) -> Result<T, String> {
    value.ok_or_else(|| MSG_REQUIRED.to_string())
}

/// Fail when a present value was sent as `null`
///
/// # Errors
///
/// Returns the "may not be null" message for `None`.
pub fn not_null<T>(value: Option<T>) -> Result<T, String> {
    value.ok_or_else(|| MSG_NULL.to_string())
}

/// Trim surrounding whitespace, reject blanks and enforce a maximum length.
///
/// Length is counted in characters, not bytes.
///
/// # Examples
///
/// ```
/// use geno_catalog::utils::validation::char_field;
///
/// assert_eq!(char_field("  TP53 ".to_string(), Some(20)).unwrap(), "TP53");
/// assert!(char_field("   ".to_string(), None).is_err());
/// assert!(char_field("x".repeat(21), Some(20)).is_err());
/// ```
///
/// # Errors
///
/// Returns a message when the trimmed text is empty or too long.
pub fn char_field(value: String, max_length: Option<usize>) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MSG_BLANK.to_string());
    }
    if let Some(max) = max_length {
        if trimmed.chars().count() > max {
            return Err(format!(
                "Ensure this field has no more than {max} characters."
            ));
        }
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse an integer from a JSON number or numeric string.
///
/// Whole-valued decimals such as `"7.0"` are accepted.
///
/// # Examples
///
/// ```
/// use geno_catalog::utils::validation::integer_field;
/// use serde_json::json;
///
/// assert_eq!(integer_field(&json!(12)), Ok(12));
/// assert_eq!(integer_field(&json!(" 12 ")), Ok(12));
/// assert!(integer_field(&json!("12.5")).is_err());
/// ```
///
/// # Errors
///
/// Returns the invalid-integer message for anything else.
pub fn integer_field(value: &serde_json::Value) -> Result<i64, String> {
    let text = match value {
        serde_json::Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                return Ok(int);
            }
            n.to_string()
        }
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return Err(MSG_INVALID_INTEGER.to_string()),
    };

    Decimal::from_str(&text)
        .ok()
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_i64())
        .ok_or_else(|| MSG_INVALID_INTEGER.to_string())
}

/// Reject negative integers
///
/// # Errors
///
/// Returns a message when `value < 0`.
pub fn non_negative(value: i64) -> Result<i64, String> {
    if value < 0 {
        Err("Ensure this value is greater than or equal to 0.".to_string())
    } else {
        Ok(value)
    }
}

/// Match a value against a closed set of labels
///
/// # Errors
///
/// Returns a "not a valid choice" message when `parse` rejects the value.
pub fn choice_field<T>(value: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, String> {
    parse(value).ok_or_else(|| format!("\"{value}\" is not a valid choice."))
}

/// Parse a textual UUID into one of the id newtypes
///
/// # Errors
///
/// Returns the invalid-UUID message when `parse` rejects the value.
pub fn uuid_field<T>(value: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, String> {
    parse(value).ok_or_else(|| MSG_INVALID_UUID.to_string())
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`)
///
/// # Errors
///
/// Returns the wrong-format message for anything else.
pub fn date_field(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| MSG_INVALID_DATE.to_string())
}

/// Parse a decimal from a JSON number or numeric string and check its precision.
///
/// Precision is counted on the value as written, so trailing zeros count
/// ("0.50000" has five decimal places).
///
/// # Errors
///
/// Returns a message when the value is not numeric or exceeds `max_digits`
/// total digits, `decimal_places` fractional digits, or the remaining
/// integer digits.
pub fn decimal_field(
    value: &serde_json::Value,
    max_digits: u32,
    decimal_places: u32,
) -> Result<Decimal, String> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return Err(MSG_INVALID_NUMBER.to_string()),
    };

    let parsed = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| MSG_INVALID_NUMBER.to_string())?;

    check_precision(parsed, max_digits, decimal_places)?;
    Ok(parsed)
}

fn check_precision(value: Decimal, max_digits: u32, decimal_places: u32) -> Result<(), String> {
    let scale = value.scale();
    let mantissa_digits = u32::try_from(value.mantissa().unsigned_abs().to_string().len())
        .unwrap_or(u32::MAX);
    let total_digits = mantissa_digits.max(scale);
    let whole_digits = total_digits - scale;
    let max_whole_digits = max_digits.saturating_sub(decimal_places);

    if total_digits > max_digits {
        Err(format!(
            "Ensure that there are no more than {max_digits} digits in total."
        ))
    } else if scale > decimal_places {
        Err(format!(
            "Ensure that there are no more than {decimal_places} decimal places."
        ))
    } else if whole_digits > max_whole_digits {
        Err(format!(
            "Ensure that there are no more than {max_whole_digits} digits before the decimal point."
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_errors_collect_and_display() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());
        assert_eq!(errors.check("symbol", Ok::<_, String>(1)), Some(1));
        assert!(errors.is_empty());

        assert_eq!(errors.check::<i32>("symbol", Err(MSG_REQUIRED.to_string())), None);
        errors.add("full_name", MSG_BLANK);
        errors.add("full_name", "second");

        assert_eq!(
            errors.to_string(),
            "full_name: This field may not be blank. second; symbol: This field is required."
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["full_name", "symbol"]);
        assert_eq!(errors.get("symbol"), Some(&[MSG_REQUIRED.to_string()][..]));
        assert!(errors.get("impact").is_none());
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some(3)), Ok(3));
        assert_eq!(required::<i32>(None), Err(MSG_REQUIRED.to_string()));
    }

    #[test]
    fn test_not_null() {
        assert_eq!(not_null(Some("TP53")), Ok("TP53"));
        assert_eq!(not_null::<&str>(None), Err(MSG_NULL.to_string()));
    }

    #[test]
    fn test_nullable_distinguishes_absent_from_null() {
        #[derive(Debug, Default, Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "nullable")]
            symbol: Option<Option<String>>,
        }

        let absent: Body = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.symbol, None);
        let null: Body = serde_json::from_value(json!({"symbol": null})).unwrap();
        assert_eq!(null.symbol, Some(None));
        let set: Body = serde_json::from_value(json!({"symbol": "TP53"})).unwrap();
        assert_eq!(set.symbol, Some(Some("TP53".to_string())));
        assert!(serde_json::from_value::<Body>(json!({"symbol": 5})).is_err());
    }

    #[test]
    fn test_integer_field() {
        assert_eq!(integer_field(&json!(7_673_802)), Ok(7_673_802));
        assert_eq!(integer_field(&json!("42")), Ok(42));
        assert_eq!(integer_field(&json!("-3")), Ok(-3));
        assert_eq!(integer_field(&json!(5.0)), Ok(5));
        for bad in [json!("far away"), json!(1.5), json!(true), json!([1]), json!(null)] {
            assert_eq!(integer_field(&bad), Err(MSG_INVALID_INTEGER.to_string()), "{bad}");
        }
    }

    #[test]
    fn test_char_field() {
        assert_eq!(char_field("TP53".to_string(), Some(20)), Ok("TP53".to_string()));
        assert_eq!(char_field(" TP53\n".to_string(), Some(20)), Ok("TP53".to_string()));
        assert_eq!(char_field(String::new(), Some(20)), Err(MSG_BLANK.to_string()));
        assert!(char_field("a".repeat(20), Some(20)).is_ok());
        assert!(char_field("a".repeat(21), Some(20))
            .unwrap_err()
            .contains("no more than 20 characters"));
        // Characters, not bytes
        assert!(char_field("é".repeat(20), Some(20)).is_ok());
        // No limit for free text
        assert!(char_field("x".repeat(10_000), None).is_ok());
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(0), Ok(0));
        assert_eq!(non_negative(i64::MAX), Ok(i64::MAX));
        assert!(non_negative(-1).is_err());
    }

    #[test]
    fn test_choice_field() {
        let parse = |s: &str| (s == "yes").then_some(true);
        assert_eq!(choice_field("yes", parse), Ok(true));
        assert_eq!(
            choice_field("no", parse),
            Err("\"no\" is not a valid choice.".to_string())
        );
    }

    #[test]
    fn test_date_field() {
        assert_eq!(
            date_field("2024-02-29"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(date_field("2023-02-29").is_err());
        assert!(date_field("29/02/2024").is_err());
        assert!(date_field("").is_err());
    }

    #[test]
    fn test_decimal_field_accepts_numbers_and_strings() {
        assert_eq!(decimal_field(&json!(0.5), 5, 4), Ok(Decimal::from_str("0.5").unwrap()));
        assert_eq!(decimal_field(&json!("0.1234"), 5, 4), Ok(Decimal::from_str("0.1234").unwrap()));
        assert_eq!(decimal_field(&json!(1), 5, 4), Ok(Decimal::ONE));
        assert_eq!(decimal_field(&json!(0), 5, 4), Ok(Decimal::ZERO));
        assert_eq!(decimal_field(&json!("1.0000"), 5, 4), Ok(Decimal::ONE));
        assert_eq!(decimal_field(&json!("0.4500"), 5, 4), Ok(Decimal::from_str("0.45").unwrap()));
    }

    #[test]
    fn test_decimal_field_counts_trailing_zeros() {
        let err = decimal_field(&json!("0.45000"), 5, 4).unwrap_err();
        assert_eq!(err, "Ensure that there are no more than 4 decimal places.");

        let err = decimal_field(&json!("1.00000"), 5, 4).unwrap_err();
        assert_eq!(err, "Ensure that there are no more than 5 digits in total.");
    }

    #[test]
    fn test_decimal_field_rejects_bad_input() {
        assert_eq!(decimal_field(&json!("abc"), 5, 4), Err(MSG_INVALID_NUMBER.to_string()));
        assert_eq!(decimal_field(&json!(true), 5, 4), Err(MSG_INVALID_NUMBER.to_string()));
        assert_eq!(decimal_field(&json!(null), 5, 4), Err(MSG_INVALID_NUMBER.to_string()));

        let err = decimal_field(&json!(0.12345), 5, 4).unwrap_err();
        assert!(err.contains("5 digits in total") || err.contains("4 decimal places"), "{err}");

        let err = decimal_field(&json!("0.00001"), 5, 4).unwrap_err();
        assert!(err.contains("4 decimal places"), "{err}");

        let err = decimal_field(&json!(12), 5, 4).unwrap_err();
        assert!(err.contains("1 digits before the decimal point"), "{err}");
    }
}
