//! Lenient parsing of user-entered numbers.
//!
//! Form fields arrive as JSON numbers, numeric strings, empty strings or not
//! at all. These helpers turn the ones that make sense into numbers and
//! return `None` for the rest, so callers decide the default.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

/// Parse a decimal from trimmed text, accepting plain and scientific
/// notation (`"12.50"`, `"-5"`, `"1e3"`).
#[must_use]
pub fn decimal_from_str(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parse a decimal from a JSON number or numeric string.
#[must_use]
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => decimal_from_str(&n.to_string()),
        Value::String(s) => decimal_from_str(s),
        _ => None,
    }
}

/// Parse an integer from a JSON number or numeric string.
///
/// Fractional input is truncated toward zero (`"2.7"` → 2).
#[must_use]
pub fn integer_from_json(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    decimal_from_json(value).and_then(|d| d.trunc().to_i64())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decimal_from_json() {
        assert_eq!(decimal_from_json(&json!(10)), Some(Decimal::TEN));
        assert_eq!(
            decimal_from_json(&json!("12.50")),
            Some(Decimal::from_str("12.50").unwrap())
        );
        assert_eq!(
            decimal_from_json(&json!(" -5 ")),
            Some(Decimal::from(-5))
        );
        assert_eq!(
            decimal_from_json(&json!("1e3")),
            Some(Decimal::from(1000))
        );
        assert_eq!(decimal_from_json(&json!("abc")), None);
        assert_eq!(decimal_from_json(&json!("")), None);
        assert_eq!(decimal_from_json(&json!(null)), None);
        assert_eq!(decimal_from_json(&json!(true)), None);
    }

    #[test]
    fn test_decimal_from_float_keeps_short_form() {
        let d = decimal_from_json(&json!(0.1)).unwrap();
        assert_eq!(d.to_string(), "0.1");
    }

    #[test]
    fn test_integer_from_json() {
        assert_eq!(integer_from_json(&json!(3)), Some(3));
        assert_eq!(integer_from_json(&json!("4")), Some(4));
        assert_eq!(integer_from_json(&json!("2.7")), Some(2));
        assert_eq!(integer_from_json(&json!(-1)), Some(-1));
        assert_eq!(integer_from_json(&json!("abc")), None);
    }
}
