//! Query conditions accumulated by the fluent builder
//!
//! A condition is a field paired with a [`Predicate`]. Plain `(field, value)`
//! pairs become `Match` predicates (or `Term` in filter context), and an
//! array value becomes a `Terms` membership test; richer comparisons go
//! through [`Operator`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{DocQueryError, Result};

/// Value type for range bounds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeValue {
    /// 64-bit integer
    Long(i64),
    /// 64-bit floating point
    Double(f64),
    /// String (for dates, keywords)
    String(String),
}

impl From<i64> for RangeValue {
    fn from(v: i64) -> Self {
        RangeValue::Long(v)
    }
}

impl From<i32> for RangeValue {
    fn from(v: i32) -> Self {
        RangeValue::Long(v as i64)
    }
}

impl From<f64> for RangeValue {
    fn from(v: f64) -> Self {
        RangeValue::Double(v)
    }
}

impl From<&str> for RangeValue {
    fn from(v: &str) -> Self {
        RangeValue::String(v.to_string())
    }
}

impl From<String> for RangeValue {
    fn from(v: String) -> Self {
        RangeValue::String(v)
    }
}

impl TryFrom<Value> for RangeValue {
    type Error = DocQueryError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(RangeValue::Long(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(RangeValue::Double(f))
                } else {
                    Ok(RangeValue::String(n.to_string()))
                }
            }
            Value::String(s) => Ok(RangeValue::String(s)),
            other => Err(DocQueryError::invalid_input(format!(
                "range bound must be a number or string, got {}",
                other
            ))),
        }
    }
}

/// Range bounds; at least one bound must be set
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<RangeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<RangeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<RangeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<RangeValue>,
}

impl RangeBounds {
    pub fn gt(mut self, v: impl Into<RangeValue>) -> Self {
        self.gt = Some(v.into());
        self
    }

    pub fn gte(mut self, v: impl Into<RangeValue>) -> Self {
        self.gte = Some(v.into());
        self
    }

    pub fn lt(mut self, v: impl Into<RangeValue>) -> Self {
        self.lt = Some(v.into());
        self
    }

    pub fn lte(mut self, v: impl Into<RangeValue>) -> Self {
        self.lte = Some(v.into());
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }
}

/// How a field is compared against its value
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Analyzed full-text match
    Match(Value),
    /// Exact term
    Term(Value),
    /// Membership in a set of exact terms
    Terms(Vec<Value>),
    /// Numeric/date/keyword range
    Range(RangeBounds),
}

impl Predicate {
    /// Check the predicate is well formed
    ///
    /// Match and term values must be scalars (string, number or boolean),
    /// terms need at least one scalar and ranges at least one bound.
    pub fn validate(&self) -> Result<()> {
        match self {
            Predicate::Match(value) | Predicate::Term(value) => check_scalar(value),
            Predicate::Terms(values) if values.is_empty() => Err(DocQueryError::invalid_input(
                "terms condition needs at least one value",
            )),
            Predicate::Terms(values) => values.iter().try_for_each(check_scalar),
            Predicate::Range(bounds) if bounds.is_unbounded() => Err(
                DocQueryError::invalid_input("range condition needs at least one bound"),
            ),
            Predicate::Range(_) => Ok(()),
        }
    }

    /// Whether the predicate compares exactly (usable as a non-scoring filter)
    pub fn is_exact(&self) -> bool {
        !matches!(self, Predicate::Match(_))
    }

    /// Full-text predicate for a raw value; arrays become membership tests
    pub fn matching(value: Value) -> Self {
        match value {
            Value::Array(values) => Predicate::Terms(values),
            other => Predicate::Match(other),
        }
    }

    /// Exact-match predicate for a raw value; arrays become membership tests
    pub fn exact(value: Value) -> Self {
        match value {
            Value::Array(values) => Predicate::Terms(values),
            other => Predicate::Term(other),
        }
    }
}

fn check_scalar(value: &Value) -> Result<()> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
        Value::Null => Err(DocQueryError::invalid_input("condition value cannot be null")),
        other => Err(DocQueryError::invalid_input(format!(
            "condition value must be a scalar, got {}",
            other
        ))),
    }
}

/// Comparison operator for `(field, operator, value)` conditions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    /// Build the predicate for `field <op> value`
    pub fn predicate(self, value: Value) -> Result<Predicate> {
        let predicate = match self {
            Operator::Eq => Predicate::matching(value),
            Operator::In => match value {
                Value::Array(values) => Predicate::Terms(values),
                other => Predicate::Terms(vec![other]),
            },
            Operator::Gt => Predicate::Range(RangeBounds::default().gt(Self::bound(value)?)),
            Operator::Gte => Predicate::Range(RangeBounds::default().gte(Self::bound(value)?)),
            Operator::Lt => Predicate::Range(RangeBounds::default().lt(Self::bound(value)?)),
            Operator::Lte => Predicate::Range(RangeBounds::default().lte(Self::bound(value)?)),
        };
        predicate.validate()?;
        Ok(predicate)
    }

    fn bound(value: Value) -> Result<RangeValue> {
        RangeValue::try_from(value)
    }
}

impl FromStr for Operator {
    type Err = DocQueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "=" | "==" | "eq" => Ok(Operator::Eq),
            ">" | "gt" => Ok(Operator::Gt),
            ">=" | "gte" => Ok(Operator::Gte),
            "<" | "lt" => Ok(Operator::Lt),
            "<=" | "lte" => Ok(Operator::Lte),
            "in" => Ok(Operator::In),
            other => Err(DocQueryError::invalid_input(format!(
                "unknown operator '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In => "in",
        };
        f.write_str(s)
    }
}

/// A field paired with its predicate
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub field: String,
    pub predicate: Predicate,
}

impl Condition {
    /// Create a condition, rejecting empty field names and malformed predicates
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Result<Self> {
        let field = field.into();
        if field.is_empty() {
            return Err(DocQueryError::invalid_input("Field name cannot be empty"));
        }
        predicate.validate()?;
        Ok(Self { field, predicate })
    }

    /// `(field, operator, value)` form
    pub fn compare(
        field: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> Result<Self> {
        Self::new(field, op.predicate(value.into())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_parsing() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::Gte);
        assert_eq!("IN".parse::<Operator>().unwrap(), Operator::In);
        assert!("<>".parse::<Operator>().is_err());
    }

    #[test]
    fn test_compare_builds_range() {
        let cond = Condition::compare("age", Operator::Gt, 15).unwrap();
        assert_eq!(
            cond.predicate,
            Predicate::Range(RangeBounds::default().gt(15))
        );
    }

    #[test]
    fn test_in_wraps_scalar() {
        let cond = Condition::compare("age", Operator::In, 27).unwrap();
        assert_eq!(cond.predicate, Predicate::Terms(vec![json!(27)]));
    }

    #[test]
    fn test_empty_field_rejected() {
        let err = Condition::new("", Predicate::Match(json!("x"))).unwrap_err();
        assert!(matches!(err, DocQueryError::InvalidInput(_)));
    }

    #[test]
    fn test_malformed_predicates_rejected() {
        assert!(Condition::new("tags", Predicate::Terms(vec![])).is_err());
        assert!(Condition::new("age", Predicate::Range(RangeBounds::default())).is_err());
        assert!(Condition::compare("age", Operator::Gt, json!(true)).is_err());
    }

    #[test]
    fn test_falsy_values_are_valid() {
        assert!(Condition::new("count", Predicate::Match(json!(0))).is_ok());
        assert!(Condition::new("name", Predicate::Term(json!(""))).is_ok());
    }

    #[test]
    fn test_exact_predicate_from_array() {
        assert_eq!(
            Predicate::exact(json!(["a", "b"])),
            Predicate::Terms(vec![json!("a"), json!("b")])
        );
        assert!(Predicate::exact(json!("a")).is_exact());
        assert!(!Predicate::Match(json!("a")).is_exact());
    }

    #[test]
    fn test_null_and_nested_values_rejected() {
        assert!(Condition::new("color", Predicate::Match(Value::Null)).is_err());
        assert!(Condition::new("color", Predicate::Term(Value::Null)).is_err());
        assert!(Condition::new("tags", Predicate::Terms(vec![json!("a"), Value::Null])).is_err());
        assert!(Condition::new("meta", Predicate::Match(json!({"k": 1}))).is_err());
        assert!(Condition::compare("color", Operator::Eq, Value::Null).is_err());
    }

    #[test]
    fn test_matching_predicate_from_array() {
        assert_eq!(
            Predicate::matching(json!(["a", "b"])),
            Predicate::Terms(vec![json!("a"), json!("b")])
        );
        assert_eq!(Predicate::matching(json!("a")), Predicate::Match(json!("a")));
        assert_eq!(
            Condition::compare("tags", Operator::Eq, json!(["x"])).unwrap().predicate,
            Predicate::Terms(vec![json!("x")])
        );
    }

    #[test]
    fn test_range_bounds_serialization() {
        let bounds = RangeBounds::default().gte(10).lt(20);
        assert_eq!(
            serde_json::to_value(&bounds).unwrap(),
            json!({"gte": 10, "lt": 20})
        );
    }
}
