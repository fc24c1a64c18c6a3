//! Selector parsing.
//!
//! A raw JSON selector is inspected once and turned into a list of
//! [`Clause`]s. Matching then walks the parsed form without looking at the
//! raw shape again.

use crate::error::{FileDbError, Result};
use serde_json::{Map, Value};

/// The literal key introducing a disjunction.
pub const OR_KEY: &str = "$or";

/// Test applied to the value found at a field path.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Loose equality with a literal.
    Eq(Value),
    /// `{"$exists": bool}`: truthy when `true`, absent or falsy when `false`.
    Exists(bool),
    /// `{"$in": [..]}`: loosely equal to one of the listed values.
    In(Vec<Value>),
    /// Any other `$` operator, or a malformed operand. Never matches.
    Unsupported(String),
}

/// One conjunct of a selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Field { path: String, condition: Condition },
    /// At least one branch must match. Branches only check plain equality.
    Or(Vec<Vec<(String, Value)>>),
    /// A top-level `$` key other than `$or`. Never matches.
    UnknownOperator(String),
}

/// A parsed query: every clause must hold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    pub(crate) clauses: Vec<Clause>,
}

impl Selector {
    /// The empty selector, matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Parse a raw JSON selector. The root must be an object.
    pub fn parse(raw: &Value) -> Result<Self> {
        let Value::Object(map) = raw else {
            return Err(FileDbError::Validation(format!(
                "selector must be an object, got {}",
                kind_of(raw)
            )));
        };

        let clauses = map
            .iter()
            .map(|(key, value)| parse_clause(key, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    /// Add an equality clause.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Field {
            path: path.into(),
            condition: Condition::Eq(value.into()),
        });
        self
    }

    pub fn exists(mut self, path: impl Into<String>, present: bool) -> Self {
        self.clauses.push(Clause::Field {
            path: path.into(),
            condition: Condition::Exists(present),
        });
        self
    }

    pub fn one_of(mut self, path: impl Into<String>, values: Vec<Value>) -> Self {
        self.clauses.push(Clause::Field {
            path: path.into(),
            condition: Condition::In(values),
        });
        self
    }
}

fn parse_clause(key: &str, value: &Value) -> Result<Clause> {
    if key == OR_KEY {
        return parse_or(value).map(Clause::Or);
    }
    if key.starts_with('$') {
        return Ok(Clause::UnknownOperator(key.to_string()));
    }
    Ok(Clause::Field {
        path: key.to_string(),
        condition: parse_condition(value),
    })
}

fn parse_or(value: &Value) -> Result<Vec<Vec<(String, Value)>>> {
    let Value::Array(branches) = value else {
        return Err(FileDbError::Validation(format!(
            "$or expects an array of selectors, got {}",
            kind_of(value)
        )));
    };

    branches
        .iter()
        .map(|branch| match branch {
            Value::Object(map) => Ok(map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            other => Err(FileDbError::Validation(format!(
                "$or branches must be objects, got {}",
                kind_of(other)
            ))),
        })
        .collect()
}

/// An object whose first key starts with `$` is an operator; anything else is a literal.
fn parse_condition(value: &Value) -> Condition {
    let Value::Object(map) = value else {
        return Condition::Eq(value.clone());
    };
    match first_operator(map) {
        Some((op, operand)) => operator_condition(op, operand),
        None => Condition::Eq(value.clone()),
    }
}

fn first_operator(map: &Map<String, Value>) -> Option<(&str, &Value)> {
    let (key, operand) = map.iter().next()?;
    key.starts_with('$').then_some((key.as_str(), operand))
}

fn operator_condition(op: &str, operand: &Value) -> Condition {
    match (op, operand) {
        ("$exists", flag) => Condition::Exists(super::value::is_truthy(Some(flag))),
        ("$in", Value::Array(values)) => Condition::In(values.clone()),
        _ => Condition::Unsupported(op.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
