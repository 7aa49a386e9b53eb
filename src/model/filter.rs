//! Filter documents: criteria, aggregators and the recursive FilterSpec.
//!
//! A filter document is a JSON object keyed by aggregator. Each value is
//! either a list of criteria or another filter document:
//!
//! ```json
//! {
//!   "all": [{"field": "demographics.age", "operator": ">=", "value": 18}],
//!   "any": {"any": [{"field": "vitals.smoker", "operator": "==", "value": true}]}
//! }
//! ```
//!
//! Parsing is strict. Shape errors surface as [`QueryError::InvalidCriterion`],
//! unknown aggregators at any depth as [`QueryError::InvalidAggregator`], and
//! unknown operators as [`QueryError::InvalidOperator`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::scalar::Scalar;
use crate::error::{QueryError, QueryResult};

/// Deepest nesting accepted for a filter document.
pub const MAX_FILTER_DEPTH: usize = 32;

// =============================================================================
// Operator
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gte,
    Lte,
    Gt,
    Lt,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
        }
    }

    pub fn is_ordering(&self) -> bool {
        !matches!(self, Operator::Eq | Operator::Ne)
    }

    /// Whether a comparison result satisfies this operator.
    pub fn accepts(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Operator::Eq => ordering == Equal,
            Operator::Ne => ordering != Equal,
            Operator::Gte => ordering != Less,
            Operator::Lte => ordering != Greater,
            Operator::Gt => ordering == Greater,
            Operator::Lt => ordering == Less,
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">=" => Ok(Operator::Gte),
            "<=" => Ok(Operator::Lte),
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            other => Err(QueryError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// =============================================================================
// Aggregator
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregator {
    /// Intersection.
    All,
    /// Union.
    Any,
}

impl Aggregator {
    pub fn token(&self) -> &'static str {
        match self {
            Aggregator::All => "all",
            Aggregator::Any => "any",
        }
    }
}

impl FromStr for Aggregator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Aggregator::All),
            "any" => Ok(Aggregator::Any),
            other => Err(QueryError::InvalidAggregator(other.to_string())),
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// Criterion
// =============================================================================

/// `instrument.field`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub instrument: String,
    pub field: String,
}

impl FromStr for FieldPath {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [instrument, field] if !instrument.is_empty() && !field.is_empty() => Ok(FieldPath {
                instrument: instrument.to_string(),
                field: field.to_string(),
            }),
            _ => Err(QueryError::InvalidCriterion(format!(
                "field path `{}` must have the form `instrument.field`",
                s
            ))),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.instrument, self.field)
    }
}

/// A single field/operator/value comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub path: FieldPath,
    pub operator: Operator,
    pub value: Scalar,
}

impl Criterion {
    pub fn new(path: &str, operator: &str, value: impl Into<Scalar>) -> QueryResult<Self> {
        Ok(Criterion {
            path: path.parse()?,
            operator: operator.parse()?,
            value: value.into(),
        })
    }

    /// Parse one criterion object. `value` defaults to null when missing.
    pub fn from_json(value: &Value) -> QueryResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            QueryError::InvalidCriterion(format!("criterion must be an object, got {}", value))
        })?;

        let path = match object.get("field") {
            None | Some(Value::Null) => {
                return Err(QueryError::InvalidCriterion(
                    "`field` is required and can not be null".into(),
                ))
            }
            Some(Value::String(path)) => path.parse::<FieldPath>()?,
            Some(_) => {
                return Err(QueryError::InvalidCriterion(
                    "`field` must be a string of the form `instrument.field`".into(),
                ))
            }
        };

        let operator = match object.get("operator") {
            None | Some(Value::Null) => {
                return Err(QueryError::InvalidCriterion(
                    "`operator` is required and can not be null".into(),
                ))
            }
            Some(Value::String(op)) => op.parse::<Operator>()?,
            Some(_) => {
                return Err(QueryError::InvalidCriterion(
                    "`operator` must be a string".into(),
                ))
            }
        };

        let raw = object.get("value").unwrap_or(&Value::Null);
        let value = Scalar::from_json(raw).ok_or_else(|| {
            QueryError::InvalidCriterion(format!(
                "`value` of `{}` must be a string, integer, boolean or null, got {}",
                path, raw
            ))
        })?;

        Ok(Criterion {
            path,
            operator,
            value,
        })
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "field": self.path.to_string(),
            "operator": self.operator.symbol(),
            "value": self.value,
        })
    }
}

// =============================================================================
// FilterSpec
// =============================================================================

/// The value side of a filter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Criteria(Vec<Criterion>),
    Nested(FilterSpec),
}

/// Ordered aggregator entries. Entries at one level combine by intersection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub entries: Vec<(Aggregator, FilterValue)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn criteria(mut self, aggregator: Aggregator, criteria: Vec<Criterion>) -> Self {
        self.entries.push((aggregator, FilterValue::Criteria(criteria)));
        self
    }

    pub fn nested(mut self, aggregator: Aggregator, spec: FilterSpec) -> Self {
        self.entries.push((aggregator, FilterValue::Nested(spec)));
        self
    }

    /// Nesting depth; an empty or flat spec has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .entries
            .iter()
            .map(|(_, value)| match value {
                FilterValue::Nested(inner) => inner.depth(),
                FilterValue::Criteria(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn from_json(value: &Value) -> QueryResult<Self> {
        Self::parse_level(value, 1)
    }

    fn parse_level(value: &Value, depth: usize) -> QueryResult<Self> {
        if depth > MAX_FILTER_DEPTH {
            return Err(QueryError::InvalidCriterion(format!(
                "filter nesting exceeds {} levels",
                MAX_FILTER_DEPTH
            )));
        }

        let object = value.as_object().ok_or_else(|| {
            QueryError::InvalidCriterion(format!("filter must be an object, got {}", value))
        })?;

        let mut entries = Vec::with_capacity(object.len());
        for (key, inner) in object {
            let aggregator: Aggregator = key.parse()?;
            let entry = match inner {
                Value::Array(items) => FilterValue::Criteria(
                    items
                        .iter()
                        .map(Criterion::from_json)
                        .collect::<QueryResult<Vec<_>>>()?,
                ),
                Value::Object(_) => FilterValue::Nested(Self::parse_level(inner, depth + 1)?),
                other => {
                    return Err(QueryError::InvalidCriterion(format!(
                        "`{}` must map to a list of criteria or a nested filter, got {}",
                        key, other
                    )))
                }
            };
            entries.push((aggregator, entry));
        }

        Ok(FilterSpec { entries })
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (aggregator, value) in &self.entries {
            let inner = match value {
                FilterValue::Criteria(criteria) => {
                    Value::Array(criteria.iter().map(Criterion::to_json).collect())
                }
                FilterValue::Nested(spec) => spec.to_json(),
            };
            object.insert(aggregator.token().to_string(), inner);
        }
        Value::Object(object)
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FilterSpec::from_json(&value).map_err(serde::de::Error::custom)
    }
}
