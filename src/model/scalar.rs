//! Scalar values and the cast contract used by criterion comparisons.
//!
//! Stored row data is an open JSON mapping. Before a comparison the stored
//! value is reduced to its *textual form*, then cast to the type of the
//! criterion value:
//!
//! | stored JSON          | textual form         |
//! |----------------------|----------------------|
//! | missing key, `null`  | absent               |
//! | `"text"`             | `text`               |
//! | `12`, `1.5`          | `12`, `1.5`          |
//! | `true` / `false`     | `true` / `false`     |
//! | array / object       | its JSON text        |
//!
//! Casting present text to boolean or integer either succeeds or fails the
//! whole evaluation with [`QueryError::InvalidCast`]. The empty string is not
//! coerced to a default: `""` fails both casts.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CastTarget, QueryError, QueryResult};

/// A criterion comparison value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Scalar {
    /// Build a scalar from a JSON value, rejecting non-scalars and floats.
    pub fn from_json(value: &Value) -> Option<Scalar> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => n.as_i64().map(Scalar::Int),
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Int(n as i64)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<Option<i64>> for Scalar {
    fn from(n: Option<i64>) -> Self {
        n.map_or(Scalar::Null, Scalar::Int)
    }
}

/// Reduce a stored JSON value to its textual form. `None` means absent.
pub fn textual_form(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Cast present text to a boolean.
///
/// Accepts (trimmed, case-insensitive) `t true y yes on 1` and
/// `f false n no off 0`. Everything else, including `""`, is an error.
pub fn cast_bool(field: &str, text: &str) -> QueryResult<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid_cast(field, text, CastTarget::Boolean)),
    }
}

/// Cast present text to an integer: optional sign and decimal digits,
/// surrounding whitespace allowed. Decimals and `""` are errors.
pub fn cast_int(field: &str, text: &str) -> QueryResult<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| invalid_cast(field, text, CastTarget::Integer))
}

fn invalid_cast(field: &str, text: &str, target: CastTarget) -> QueryError {
    QueryError::InvalidCast {
        field: field.to_string(),
        value: text.to_string(),
        target,
    }
}

/// Compare a stored value against a criterion value after casting.
///
/// Returns `Ok(None)` when the stored value is absent (the comparison is
/// unknown and never matches), otherwise the ordering of stored vs. criterion.
pub fn compare_stored(
    field: &str,
    stored: Option<&Value>,
    value: &Scalar,
) -> QueryResult<Option<Ordering>> {
    let Some(text) = textual_form(stored) else {
        return Ok(None);
    };

    let ordering = match value {
        Scalar::Bool(expected) => cast_bool(field, &text)?.cmp(expected),
        Scalar::Int(expected) => cast_int(field, &text)?.cmp(expected),
        Scalar::Text(expected) => text.as_str().cmp(expected.as_str()),
        Scalar::Null => return Ok(None),
    };
    Ok(Some(ordering))
}
