//! Value helpers used by the matcher: dotted-path lookup, truthiness and
//! loose (type-coercing) equality.
//!
//! Loose equality follows the familiar scripting-language `==` rules on JSON
//! values, so a selector written as `{"age": "42"}` matches a stored `42`:
//!
//! | left              | right    | rule                                       |
//! |-------------------|----------|--------------------------------------------|
//! | missing           | `null`   | equal                                      |
//! | missing           | anything | not equal                                  |
//! | `null`            | `null`   | equal, `null` equals nothing else          |
//! | bool              | any      | bool becomes `1`/`0`, compare again        |
//! | number            | string   | string is parsed as a number               |
//! | array/object      | scalar   | container becomes its string form          |
//! | array/object      | same kind| structural equality                        |
//!
//! Containers are compared structurally rather than by identity, since values
//! loaded from disk never share identity with the selector.

use serde_json::Value;

/// Walk `segments` starting at `start`. Arrays accept numeric segments.
pub fn descend<'a, 'p>(
    start: &'a Value,
    segments: impl IntoIterator<Item = &'p str>,
) -> Option<&'a Value> {
    segments
        .into_iter()
        .try_fold(start, |current, segment| step(current, segment))
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Resolve a possibly dotted key (`"a.b.c"`) against a record.
/// Any missing intermediate segment yields `None`.
pub fn resolve<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    descend(record, path.split('.'))
}

/// Falsy values are: missing, `null`, `false`, `0`, and `""`.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Loose equality between a resolved (possibly missing) value and a literal.
pub fn loose_eq(resolved: Option<&Value>, literal: &Value) -> bool {
    match resolved {
        None => literal.is_null(),
        Some(value) => values_loose_eq(value, literal),
    }
}

/// Loose equality between two present values.
pub fn values_loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,

        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => x == y,

        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => a == b,
        (Value::Array(_), Value::Object(_)) | (Value::Object(_), Value::Array(_)) => false,

        (Value::Bool(x), other) => values_loose_eq(&bool_as_number(*x), other),
        (other, Value::Bool(y)) => values_loose_eq(other, &bool_as_number(*y)),

        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match (n.as_f64(), string_to_number(s)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }

        (container @ (Value::Array(_) | Value::Object(_)), scalar)
        | (scalar, container @ (Value::Array(_) | Value::Object(_))) => {
            values_loose_eq(&Value::String(to_display_string(container)), scalar)
        }
    }
}

fn bool_as_number(b: bool) -> Value {
    Value::from(if b { 1 } else { 0 })
}

/// Numeric reading of a string. `None` stands for "not a number".
fn string_to_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    // Rust accepts "inf" and "nan" spellings that must not count as numbers here.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn number_to_string(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{:.0}", f)
    } else {
        format!("{}", f)
    }
}

/// String form of a value as used when a container meets a scalar.
fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(number_to_string).unwrap_or_default(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
