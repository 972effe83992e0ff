//! Constraint factories
//!
//! Length constraints measure strings in characters, lists in elements and
//! mappings in entries. Value constraints compare numbers; any other value
//! fails them.

use dataspec_core::value::{describe, values_equal};
use dataspec_core::Constraint;
use serde_json::Value;

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}

fn length_constraint<F>(test: F, message: String) -> Constraint
where
    F: Fn(usize) -> bool + Send + Sync + 'static,
{
    Constraint::new(move |v| length(v).map(&test).unwrap_or(false), message)
}

fn value_constraint<F>(test: F, message: String) -> Constraint
where
    F: Fn(f64) -> bool + Send + Sync + 'static,
{
    Constraint::new(move |v| v.as_f64().map(&test).unwrap_or(false), message)
}

pub fn min_len(min: usize) -> Constraint {
    length_constraint(move |n| n >= min, format!("Must have length >= {}", min))
}

pub fn max_len(max: usize) -> Constraint {
    length_constraint(move |n| n <= max, format!("Must have length <= {}", max))
}

pub fn range_len(min: usize, max: usize) -> Constraint {
    length_constraint(
        move |n| (min..=max).contains(&n),
        format!("Must have length between {}-{}", min, max),
    )
}

pub fn exact_len(len: usize) -> Constraint {
    length_constraint(move |n| n == len, format!("Must have exact length {}", len))
}

/// Substring for strings, element for lists, key for mappings
pub fn contains<V: Into<Value>>(needle: V) -> Constraint {
    contains_value(needle.into())
}

fn contains_value(needle: Value) -> Constraint {
    let message = format!("Must contain {}", describe(&needle));
    Constraint::new(
        move |v| match (v, &needle) {
            (Value::String(s), Value::String(sub)) => s.contains(sub.as_str()),
            (Value::Array(items), _) => items.iter().any(|item| values_equal(item, &needle)),
            (Value::Object(map), Value::String(key)) => map.contains_key(key),
            _ => false,
        },
        message,
    )
}

pub fn min_value(min: f64) -> Constraint {
    value_constraint(move |n| n >= min, format!("Must be >= {}", min))
}

pub fn max_value(max: f64) -> Constraint {
    value_constraint(move |n| n <= max, format!("Must be <= {}", max))
}

pub fn range_value(min: f64, max: f64) -> Constraint {
    value_constraint(
        move |n| min <= n && n <= max,
        format!("Must be between {}-{}", min, max),
    )
}
