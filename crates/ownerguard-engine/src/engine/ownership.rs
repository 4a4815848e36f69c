//! Comparisons between fetched field values and ids.

use serde_json::Value;

/// Numeric-aware equality: integers compare by value, strings only when
/// they are exactly a decimal integer.
pub fn value_is_id(v: &Value, id: i64) -> bool {
    match v {
        Value::Number(n) => n.as_i64() == Some(id),
        Value::String(s) => s.parse::<i64>().ok() == Some(id),
        _ => false,
    }
}

/// Fetched value equals a literal from a condition's `value`.
pub fn value_is_literal(v: &Value, literal: &str) -> bool {
    match v {
        Value::String(s) => s == literal,
        Value::Number(_) => literal
            .parse::<i64>()
            .map(|id| value_is_id(v, id))
            .unwrap_or(false),
        Value::Bool(b) => literal == if *b { "true" } else { "false" },
        _ => false,
    }
}
