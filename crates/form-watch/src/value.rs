//! JSON value helpers shared by the flattener and the change mapper.

use serde_json::Value;

/// JavaScript truthiness of a JSON value.
///
/// `null`, `false`, `0` and `""` are falsy; every object and array,
/// including empty ones, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
