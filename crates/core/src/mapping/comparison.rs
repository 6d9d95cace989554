//! Property value comparison used for change detection.

use serde_json::Value;

use crate::settings::PropertyComparison;

/// Compares the current value of a property (`None` when unset) with a new one.
pub fn values_equal(current: Option<&Value>, new: &Value, mode: PropertyComparison) -> bool {
    let current = current.unwrap_or(&Value::Null);
    match mode {
        PropertyComparison::Strict => current == new,
        PropertyComparison::Loose => loose_eq(current, new),
    }
}

/// Coercive equality.
///
/// Numbers compare numerically, numeric strings compare with numbers,
/// booleans compare with the truthiness of the other side and null equals
/// any empty value.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, other) | (other, Value::Null) => is_empty(other),
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == truthy(other),
        (Value::Number(_), Value::Number(_)) => as_f64(a) == as_f64(b),
        (Value::Number(_), Value::String(s)) | (Value::String(s), Value::Number(_)) => {
            let number = if a.is_number() { a } else { b };
            match numeric(s) {
                Some(parsed) => Some(parsed) == as_f64(number),
                None => false,
            }
        }
        (Value::String(x), Value::String(y)) => match (numeric(x), numeric(y)) {
            (Some(nx), Some(ny)) => nx == ny,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loose_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map(|other| loose_eq(v, other)).unwrap_or(false))
        }
        _ => false,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(_) => as_f64(value) == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::String(s) => !(s.is_empty() || s == "0"),
        other => !is_empty(other),
    }
}
