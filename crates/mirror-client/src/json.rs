//! Typed field access on JSON objects received from a remote.
//!
//! Every accessor defaults instead of failing: a missing field, a field of
//! the wrong type, or a receiver that is not an object all give the default.

use serde_json::Value;

/// Integer field, `default` if absent or not a number.
///
/// Remotes may send integers as floating point numbers; those are truncated.
pub fn get_i64(json: &Value, key: &str, default: i64) -> i64 {
    match json.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(default),
        _ => default,
    }
}

/// String field, `None` if absent or not a string.
pub fn get_str<'a>(json: &'a Value, key: &str) -> Option<&'a str> {
    json.get(key).and_then(Value::as_str)
}

/// Boolean field, `true` only for a JSON `true`.
pub fn get_bool(json: &Value, key: &str) -> bool {
    matches!(json.get(key), Some(Value::Bool(true)))
}

pub fn get_array<'a>(json: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    json.get(key).and_then(Value::as_array)
}
