//! Condition — a single comparison predicate over the event context.
//!
//! Evaluation is pure and total: every malformed input (missing value,
//! failed coercion, non-list operand for `in`, unrecognized operator)
//! evaluates to `false`. Conditions fail closed, they never fail open and
//! never panic.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::interpolate::lookup_path;

/// Comparison operator applied between a context value and the operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    IsNull,
    IsNotNull,
    In,
    NotIn,
    /// Any operator id this engine does not recognize. Always evaluates to
    /// `false`; the executor reports it as a configuration warning.
    #[serde(other)]
    Unknown,
}

impl Operator {
    /// The snake_case id used in stored conditions.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterThanOrEqual => "greater_than_or_equal",
            Self::LessThanOrEqual => "less_than_or_equal",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this is the fail-closed placeholder for unrecognized ids.
    #[must_use]
    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Apply this operator to a context value (absent when the dot-path did
    /// not resolve) and the configured operand.
    #[must_use]
    pub fn compare(self, actual: Option<&Value>, expected: &Value) -> bool {
        match self {
            Self::Equals => actual.is_some_and(|v| v == expected),
            Self::NotEquals => !Self::Equals.compare(actual, expected),
            Self::GreaterThan => numeric(actual, expected).is_some_and(|(a, b)| a > b),
            Self::LessThan => numeric(actual, expected).is_some_and(|(a, b)| a < b),
            Self::GreaterThanOrEqual => numeric(actual, expected).is_some_and(|(a, b)| a >= b),
            Self::LessThanOrEqual => numeric(actual, expected).is_some_and(|(a, b)| a <= b),
            Self::Contains => textual(actual, expected).is_some_and(|(a, b)| a.contains(&b)),
            Self::NotContains => {
                textual(actual, expected).is_some_and(|(a, b)| !a.contains(&b))
            }
            Self::StartsWith => textual(actual, expected).is_some_and(|(a, b)| a.starts_with(&b)),
            Self::EndsWith => textual(actual, expected).is_some_and(|(a, b)| a.ends_with(&b)),
            Self::IsEmpty => is_empty(actual),
            Self::IsNotEmpty => !is_empty(actual),
            Self::IsNull => is_null(actual),
            Self::IsNotNull => !is_null(actual),
            Self::In => expected
                .as_array()
                .is_some_and(|list| actual.is_some_and(|v| list.contains(v))),
            Self::NotIn => expected
                .as_array()
                .is_some_and(|list| !actual.is_some_and(|v| list.contains(v))),
            Self::Unknown => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coerce both sides to numbers; numeric strings count, everything else fails.
fn numeric(actual: Option<&Value>, expected: &Value) -> Option<(f64, f64)> {
    Some((as_number(actual?)?, as_number(expected)?))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce both sides to text; only scalars coerce, null and composites fail.
fn textual(actual: Option<&Value>, expected: &Value) -> Option<(String, String)> {
    Some((as_text(actual?)?, as_text(expected)?))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Absent paths, nulls, and whitespace-only strings count as empty.
fn is_empty(actual: Option<&Value>) -> bool {
    match actual {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn is_null(actual: Option<&Value>) -> bool {
    matches!(actual, None | Some(Value::Null))
}

/// A predicate over the execution context.
///
/// All conditions of a rule must be satisfied (logical AND) before its
/// actions run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dot-path into the context, e.g. `newData.status`.
    pub field: String,
    /// Comparison to apply.
    pub operator: Operator,
    /// Operand; an array for `in`/`not_in`, ignored by the unary operators.
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    /// Resolve `field` against the context and apply the operator.
    #[must_use]
    pub fn is_met(&self, context: &Value) -> bool {
        self.operator
            .compare(lookup_path(context, &self.field), &self.value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}
