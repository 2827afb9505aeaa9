//! Value coercions shared by pattern detection and the extractor runtime

use serde_json::{Number, Value};

/// Coerce to an integer; integral floats and numeric strings are accepted
pub fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(value.clone())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.is_finite() && f.abs() < i64::MAX as f64 {
                    Some(Value::from(f as i64))
                } else {
                    None
                }
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

/// Coerce to a float
pub fn to_float(value: &Value) -> Option<Value> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Number::from_f64(f).map(Value::Number)
}

/// Coerce scalars to their string representation
pub fn to_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

/// Coerce to a boolean; accepts common textual and numeric spellings
pub fn to_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "n" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

pub fn lowercase(value: &Value) -> Option<Value> {
    value.as_str().map(|s| Value::String(s.to_lowercase()))
}

pub fn uppercase(value: &Value) -> Option<Value> {
    value.as_str().map(|s| Value::String(s.to_uppercase()))
}

pub fn trim(value: &Value) -> Option<Value> {
    value.as_str().map(|s| Value::String(s.trim().to_string()))
}
