//! Simple-type classification capability
//!
//! The engine never decides on its own what counts as "an int" or "a string".
//! It asks a [`TypeClassifier`], which callers may replace to change the
//! catalog of simple types. [`JsonClassifier`] is the default catalog over
//! JSON values.
//!
//! Copyright (c) 2025 Dataspec Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Name of a simple type understood by a [`TypeClassifier`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(Cow<'static, str>);

impl TypeTag {
    pub const ANY: TypeTag = TypeTag(Cow::Borrowed("any"));
    pub const NULL: TypeTag = TypeTag(Cow::Borrowed("null"));
    pub const BOOL: TypeTag = TypeTag(Cow::Borrowed("bool"));
    pub const INT: TypeTag = TypeTag(Cow::Borrowed("int"));
    pub const FLOAT: TypeTag = TypeTag(Cow::Borrowed("float"));
    pub const NUMBER: TypeTag = TypeTag(Cow::Borrowed("number"));
    pub const STR: TypeTag = TypeTag(Cow::Borrowed("str"));
    pub const LIST: TypeTag = TypeTag(Cow::Borrowed("list"));
    pub const DICT: TypeTag = TypeTag(Cow::Borrowed("dict"));

    /// Create a tag for a caller-defined simple type
    pub fn new<S: Into<Cow<'static, str>>>(name: S) -> Self {
        TypeTag(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TypeTag {
    fn from(name: &'static str) -> Self {
        TypeTag(Cow::Borrowed(name))
    }
}

/// Classifies raw values against simple-type tags
///
/// Implementations must be deterministic and free of side effects; the same
/// classifier may be shared by concurrent checks.
pub trait TypeClassifier: Send + Sync {
    /// Whether `value` is an instance of the simple type `tag`
    fn matches(&self, value: &Value, tag: &TypeTag) -> bool;

    /// Canonical form of a value already known to match `tag`
    fn canonicalize(&self, value: Value, _tag: &TypeTag) -> Value {
        value
    }

    /// Elements of an iterable value, or `None` if it is not iterable
    fn elements<'v>(&self, value: &'v Value) -> Option<&'v [Value]> {
        value.as_array().map(Vec::as_slice)
    }

    /// Entries of a mapping value, or `None` if it is not a mapping
    fn entries<'v>(&self, value: &'v Value) -> Option<&'v Map<String, Value>> {
        value.as_object()
    }
}

/// Default simple-type catalog for JSON values
///
/// `int` and `float` are disjoint: `5` is not a float and `4.2` is not an int.
/// `number` accepts both. Unknown tags never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonClassifier;

impl TypeClassifier for JsonClassifier {
    fn matches(&self, value: &Value, tag: &TypeTag) -> bool {
        match tag.name() {
            "any" => true,
            "null" => value.is_null(),
            "bool" => value.is_boolean(),
            "int" => value.is_i64() || value.is_u64(),
            "float" => value.is_f64(),
            "number" => value.is_number(),
            "str" => value.is_string(),
            "list" => value.is_array(),
            "dict" => value.is_object(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_classifier_catalog() {
        let classifier = JsonClassifier;
        let cases = [
            (TypeTag::STR, json!("a string"), json!(5)),
            (TypeTag::INT, json!(5), json!("not an int")),
            (TypeTag::FLOAT, json!(4.2), json!(5)),
            (TypeTag::BOOL, json!(false), json!("not a bool")),
            (TypeTag::NULL, Value::Null, json!("not null")),
            (TypeTag::LIST, json!(["a list", 5, 4.2]), json!("not a list")),
            (TypeTag::DICT, json!({"a dict": 5}), json!(174)),
            (TypeTag::NUMBER, json!(1.5), json!(true)),
        ];

        for (tag, good, bad) in cases {
            assert!(classifier.matches(&good, &tag), "{} should match {}", tag, good);
            assert!(!classifier.matches(&bad, &tag), "{} should not match {}", tag, bad);
        }
    }

    #[test]
    fn test_any_and_unknown_tags() {
        let classifier = JsonClassifier;
        assert!(classifier.matches(&json!({"x": 1}), &TypeTag::ANY));
        assert!(!classifier.matches(&json!(1), &TypeTag::new("complex")));
    }

    #[test]
    fn test_default_capabilities() {
        let classifier = JsonClassifier;
        assert_eq!(classifier.elements(&json!([1, 2])).map(|e| e.len()), Some(2));
        assert!(classifier.elements(&json!("ab")).is_none());
        assert!(classifier.entries(&json!({"a": 1})).is_some());
        assert!(classifier.entries(&json!([1])).is_none());
        assert_eq!(classifier.canonicalize(json!(3), &TypeTag::INT), json!(3));
    }
}
