//! Scalar values carried by literals, identifiers and compiled predicates

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

/// A typed scalar value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<FixedOffset>),
    String(String),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Coerce a raw attribute or text value into the most specific scalar type.
///
/// Attempts, in this order: integer, float, boolean literal (`true`/`false`),
/// and falls back to the unchanged string. Never fails. Only finite decimal
/// notation counts as a float, so `NaN` or `inf` stay strings.
pub fn auto_cast(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }

    if looks_decimal(raw) {
        if let Ok(x) = raw.parse::<f64>() {
            if x.is_finite() {
                return Value::Float(x);
            }
        }
    }

    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => Value::String(raw.to_string()),
    }
}

fn looks_decimal(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && raw.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_cast_order() {
        assert_eq!(auto_cast("42"), Value::Integer(42));
        assert_eq!(auto_cast("-7"), Value::Integer(-7));
        assert_eq!(auto_cast("3.5"), Value::Float(3.5));
        assert_eq!(auto_cast("1e3"), Value::Float(1000.0));
        assert_eq!(auto_cast("true"), Value::Boolean(true));
        assert_eq!(auto_cast("false"), Value::Boolean(false));
        assert_eq!(auto_cast("abc"), Value::string("abc"));
    }

    #[test]
    fn test_auto_cast_keeps_non_numeric_spellings() {
        assert_eq!(auto_cast("NaN"), Value::string("NaN"));
        assert_eq!(auto_cast("inf"), Value::string("inf"));
        assert_eq!(auto_cast("True"), Value::string("True"));
        assert_eq!(auto_cast(""), Value::string(""));
        assert_eq!(auto_cast("1.2.3"), Value::string("1.2.3"));
    }
}
