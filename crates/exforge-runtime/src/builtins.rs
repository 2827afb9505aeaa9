//! Built-in function implementations
//!
//! Null inputs propagate: every function except `value.default` returns null
//! when its subject is null, so missing source fields never abort extraction.

use crate::error::{Result, RuntimeError};
use exforge_core::functions;
use exforge_core::types::coerce;
use serde_json::Value;

/// Call a built-in function with already evaluated arguments
pub fn call(function: &str, args: Vec<Value>) -> Result<Value> {
    let spec =
        functions::lookup(function).ok_or_else(|| RuntimeError::UnknownFunction(function.to_string()))?;
    if !spec.accepts_arity(args.len()) {
        let expected = match spec.max_args {
            Some(max) if max == spec.min_args => max.to_string(),
            Some(max) => format!("{}-{}", spec.min_args, max),
            None => format!("at least {}", spec.min_args),
        };
        return Err(RuntimeError::ArityMismatch {
            callee: function.to_string(),
            expected,
            actual: args.len(),
        });
    }

    match function {
        "text.lower" => map_text(function, &args[0], str::to_lowercase),
        "text.upper" => map_text(function, &args[0], str::to_uppercase),
        "text.trim" => map_text(function, &args[0], |s| s.trim().to_string()),
        "text.concat" => join_parts(function, "", &args),
        "text.join" => {
            let separator = args[0]
                .as_str()
                .ok_or_else(|| RuntimeError::type_error(function, "separator must be a string"))?;
            join_parts(function, separator, &args[1..])
        }
        "coerce.to_integer" => convert(function, &args[0], coerce::to_integer, "integer"),
        "coerce.to_float" => convert(function, &args[0], coerce::to_float, "float"),
        "coerce.to_string" => convert(function, &args[0], coerce::to_string, "string"),
        "coerce.to_boolean" => convert(function, &args[0], coerce::to_boolean, "boolean"),
        "value.default" => {
            let mut args = args.into_iter();
            let first = args.next().unwrap_or(Value::Null);
            let fallback = args.next().unwrap_or(Value::Null);
            Ok(if first.is_null() { fallback } else { first })
        }
        other => Err(RuntimeError::UnknownFunction(other.to_string())),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn map_text(function: &str, value: &Value, f: impl Fn(&str) -> String) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let text = scalar_text(value)
        .ok_or_else(|| RuntimeError::type_error(function, format!("cannot treat {} as text", value)))?;
    Ok(Value::String(f(&text)))
}

/// Join scalar parts, skipping nulls; a single array argument is joined element-wise
fn join_parts(function: &str, separator: &str, parts: &[Value]) -> Result<Value> {
    let items: Vec<&Value> = match parts {
        [Value::Array(items)] => items.iter().collect(),
        _ => parts.iter().collect(),
    };

    let mut texts = Vec::with_capacity(items.len());
    for item in items {
        if item.is_null() {
            continue;
        }
        let text = scalar_text(item).ok_or_else(|| {
            RuntimeError::type_error(function, format!("cannot join non-scalar value {}", item))
        })?;
        texts.push(text);
    }
    if texts.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::String(texts.join(separator)))
}

fn convert(
    function: &str,
    value: &Value,
    f: fn(&Value) -> Option<Value>,
    target: &str,
) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    f(value).ok_or_else(|| {
        RuntimeError::type_error(function, format!("cannot convert {} to {}", value, target))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_functions() {
        assert_eq!(call("text.lower", vec![json!("ADA")]).unwrap(), json!("ada"));
        assert_eq!(call("text.upper", vec![json!("ada")]).unwrap(), json!("ADA"));
        assert_eq!(call("text.trim", vec![json!("  x ")]).unwrap(), json!("x"));
        assert_eq!(call("text.upper", vec![json!(12)]).unwrap(), json!("12"));
        assert_eq!(call("text.lower", vec![Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn test_join_separator_first() {
        let out = call("text.join", vec![json!(", "), json!("Ada"), json!("Lovelace")]).unwrap();
        assert_eq!(out, json!("Ada, Lovelace"));

        let skipped = call("text.join", vec![json!(" "), json!("Ada"), Value::Null]).unwrap();
        assert_eq!(skipped, json!("Ada"));

        let array = call("text.join", vec![json!("-"), json!(["a", "b", 3])]).unwrap();
        assert_eq!(array, json!("a-b-3"));

        assert!(call("text.join", vec![json!(1), json!("a")]).is_err());
    }

    #[test]
    fn test_concat() {
        let out = call("text.concat", vec![json!("a"), json!(1), json!(true)]).unwrap();
        assert_eq!(out, json!("a1true"));
        assert_eq!(call("text.concat", vec![Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn test_coercions() {
        assert_eq!(call("coerce.to_integer", vec![json!("42")]).unwrap(), json!(42));
        assert_eq!(call("coerce.to_float", vec![json!("2.5")]).unwrap(), json!(2.5));
        assert_eq!(call("coerce.to_string", vec![json!(7)]).unwrap(), json!("7"));
        assert_eq!(call("coerce.to_boolean", vec![json!("yes")]).unwrap(), json!(true));
        assert_eq!(call("coerce.to_integer", vec![Value::Null]).unwrap(), Value::Null);

        let err = call("coerce.to_integer", vec![json!("abc")]).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { .. }));
    }

    #[test]
    fn test_default() {
        assert_eq!(call("value.default", vec![Value::Null, json!(0)]).unwrap(), json!(0));
        assert_eq!(call("value.default", vec![json!(5), json!(0)]).unwrap(), json!(5));
    }

    #[test]
    fn test_unknown_and_arity() {
        assert!(matches!(
            call("process.exec", vec![json!("ls")]),
            Err(RuntimeError::UnknownFunction(_))
        ));
        assert!(matches!(
            call("text.lower", vec![json!("a"), json!("b")]),
            Err(RuntimeError::ArityMismatch { .. })
        ));
    }
}
