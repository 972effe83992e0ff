//! Helpers over the runtime value domain (`serde_json::Value`)
//!
//! Copyright (c) 2025 Dataspec Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;

/// Default "use default" predicate
///
/// A value is semantically empty when it is the absent marker (`null`), numeric
/// zero, an empty string, an empty list or an empty mapping. Booleans are never
/// considered empty, so an explicit `false` is always kept.
pub fn is_semantically_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(_) => false,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Alternative predicate that keeps explicit numbers and booleans
///
/// Only `null` and empty strings, lists and mappings count as unset.
pub fn is_null_or_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(_) | Value::Number(_) => false,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Short rendering of a value for messages
pub fn describe(value: &Value) -> String {
    const LIMIT: usize = 60;
    let rendered = value.to_string();
    if rendered.chars().count() > LIMIT {
        let truncated: String = rendered.chars().take(LIMIT).collect();
        format!("{}...", truncated)
    } else {
        rendered
    }
}

/// Hashable, equality-stable key derived from a value
///
/// Integral floats collapse onto integers so that `1` and `1.0` produce the
/// same key. Mappings have no key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Bool(bool),
    Int(i128),
    Float(u64),
    Str(String),
    Seq(Vec<ValueKey>),
}

impl ValueKey {
    /// Derive the key of a value, or `None` if the value is not hashable
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(ValueKey::Null),
            Value::Bool(b) => Some(ValueKey::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ValueKey::Int(i as i128))
                } else if let Some(u) = n.as_u64() {
                    Some(ValueKey::Int(u as i128))
                } else {
                    let f = n.as_f64()?;
                    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e38 {
                        Some(ValueKey::Int(f as i128))
                    } else {
                        Some(ValueKey::Float(f.to_bits()))
                    }
                }
            }
            Value::String(s) => Some(ValueKey::Str(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(ValueKey::of)
                .collect::<Option<Vec<_>>>()
                .map(ValueKey::Seq),
            Value::Object(_) => None,
        }
    }
}

/// Numeric-aware equality: `1 == 1.0`, containers compared element-wise
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (ValueKey::of(a), ValueKey::of(b)) {
            (Some(ka), Some(kb)) => ka == kb,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, xv)| ym.get(k).map(|yv| values_equal(xv, yv)).unwrap_or(false))
        }
        _ => a == b,
    }
}

/// Render a canonical mapping key from a canonicalized key value
pub fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
