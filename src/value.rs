use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// A typed value, either a literal from a parsed query or a field read from a record.
///
/// Integers and decimals are kept apart so that `id eq 1` compares exactly,
/// while `paycheck le 1000.50` uses base-10 arithmetic instead of floats.
///
/// # Examples
///
/// ```
/// use sift_lang::Value;
/// use rust_decimal::Decimal;
/// use std::cmp::Ordering;
///
/// let a = Value::Integer(1000);
/// let b = Value::Decimal(Decimal::new(100000, 2)); // 1000.00
/// assert_eq!(a.compare(&b), Some(Ordering::Equal));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used for mixed integer/decimal comparisons.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(n) => Some(Decimal::from(*n)),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Natural ordering between two values of compatible types.
    ///
    /// Returns `None` when the types cannot be ordered against each other
    /// (including anything involving `Null`, arrays or objects).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(_) | Value::Decimal(_), Value::Integer(_) | Value::Decimal(_)) => {
                Some(self.as_decimal()?.cmp(&other.as_decimal()?))
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Position of this value's type in the sort order used across types.
    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) | Value::Decimal(_) => 2,
            Value::String(_) => 3,
            Value::Date(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    /// Total ordering for sorting: values of one type use [`Value::compare`],
    /// different types order null < boolean < number < string < date < array
    /// < object. Arrays and objects are equal to others of their kind.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|| self.type_rank().cmp(&other.type_rank()))
    }
}

/// Parse an ISO-8601 date or date-time. Dates without a time are midnight UTC.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Ok(d) = Decimal::from_str(&n.to_string()) {
                    Value::Decimal(d)
                } else {
                    // Out of Decimal's exact range; fall back to the nearest representable.
                    n.as_f64()
                        .and_then(Decimal::from_f64)
                        .map(Value::Decimal)
                        .unwrap_or(Value::Null)
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => Value::Array(arr.iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_numeric_compare() {
        let a = Value::Integer(800);
        let b = Value::Decimal(Decimal::new(100000, 2));
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(b.compare(&a), Some(Ordering::Greater));
        assert_eq!(a.compare(&Value::String("800".into())), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn test_sort_cmp_orders_across_types() {
        let mut values = vec![
            Value::String("a".into()),
            Value::Integer(2),
            Value::Boolean(true),
            Value::Decimal(Decimal::new(15, 1)),
            Value::String("B".into()),
            Value::Integer(1),
        ];
        values.sort_by(Value::sort_cmp);
        assert_eq!(
            values,
            vec![
                Value::Boolean(true),
                Value::Integer(1),
                Value::Decimal(Decimal::new(15, 1)),
                Value::Integer(2),
                Value::String("B".into()),
                Value::String("a".into()),
            ]
        );
        assert_eq!(
            Value::Array(vec![]).sort_cmp(&Value::Array(vec![Value::Integer(1)])),
            Ordering::Equal
        );
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = parse_date("2024-03-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(parse_date("2024-03-01T10:30:00").is_some());
        assert!(parse_date("2024-03-01 10:30:00").is_some());
        assert!(parse_date("2024-03-01T10:30:00+02:00").is_some());
        assert!(parse_date("March 1st").is_none());
    }

    #[test]
    fn test_from_json_numbers() {
        let v: serde_json::Value = serde_json::from_str("[1, 1000.50, -3]").unwrap();
        assert_eq!(
            Value::from(&v),
            Value::Array(vec![
                Value::Integer(1),
                Value::Decimal(Decimal::new(100050, 2)),
                Value::Integer(-3),
            ])
        );
    }
}
