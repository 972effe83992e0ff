//! Leaf nodes: a single simple type, or a finite set of literals

use super::Spec;
use crate::classifier::TypeTag;
use crate::constraint::{check_constraints, Constraint};
use crate::context::CheckContext;
use crate::error::{CheckResult, FailureKind, SchemaError, ValidationError};
use crate::value::{describe, ValueKey};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Fallible transformation of a matched value into its canonical form
pub type Canonicalizer = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Wraps one simple-type tag with an optional canonicalizer
#[derive(Clone)]
pub struct Type {
    tag: TypeTag,
    canonicalize: Option<Canonicalizer>,
    constraints: Vec<Constraint>,
}

impl Type {
    pub fn new<T: Into<TypeTag>>(tag: T) -> Self {
        Self {
            tag: tag.into(),
            canonicalize: None,
            constraints: Vec::new(),
        }
    }

    /// Canonicalize matched values through an infallible function
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.try_map(move |v| Ok(f(v)))
    }

    /// Canonicalize matched values through a fallible function
    ///
    /// An `Err` makes the value invalid for this node.
    pub fn try_map<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.canonicalize = Some(Arc::new(f));
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }
}

impl Spec for Type {
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value> {
        let classifier = context.classifier();
        if !classifier.matches(value, &self.tag) {
            return Err(ValidationError::new(
                FailureKind::TypeMismatch,
                &context.path,
                format!("Must be {}", self.tag),
            ));
        }
        check_constraints(&self.constraints, value, context)?;

        let canonical = classifier.canonicalize(value.clone(), &self.tag);
        match &self.canonicalize {
            Some(f) => f(&canonical).map_err(|e| {
                ValidationError::new(
                    FailureKind::CanonicalizationFailed,
                    &context.path,
                    format!("Canonicalization to {} failed: {}", self.tag, e),
                )
            }),
            None => Ok(canonical),
        }
    }

    fn type_name(&self) -> String {
        self.tag.to_string()
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("tag", &self.tag)
            .field("canonicalize", &self.canonicalize.is_some())
            .field("constraints", &self.constraints)
            .finish()
    }
}

/// Matches against a finite set of literal values
///
/// The returned value is always the stored literal, so equal-but-distinct
/// inputs (`1.0` for a stored `1`) collapse onto one representation.
#[derive(Debug, Clone)]
pub struct EnumSpec {
    values: Vec<Value>,
    index: HashMap<ValueKey, usize>,
    constraints: Vec<Constraint>,
}

impl EnumSpec {
    /// Build from literal values; duplicates collapse onto the first occurrence
    pub fn new<I>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut stored = Vec::new();
        let mut index = HashMap::new();
        for value in values {
            let value = value.into();
            let key = ValueKey::of(&value).ok_or_else(|| SchemaError::NonHashableEnumValue {
                value: describe(&value),
            })?;
            if !index.contains_key(&key) {
                index.insert(key, stored.len());
                stored.push(value);
            }
        }
        Ok(Self {
            values: stored,
            index,
            constraints: Vec::new(),
        })
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Stored literals in first-seen order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn lookup(&self, value: &Value) -> Option<&Value> {
        let key = ValueKey::of(value)?;
        self.index.get(&key).map(|&i| &self.values[i])
    }
}

impl Spec for EnumSpec {
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value> {
        match self.lookup(value) {
            Some(stored) => {
                check_constraints(&self.constraints, stored, context)?;
                Ok(stored.clone())
            }
            None => Err(ValidationError::new(
                FailureKind::NotEnumerated,
                &context.path,
                format!("Must match {}", self.type_name()),
            )),
        }
    }

    fn type_name(&self) -> String {
        let rendered: Vec<String> = self.values.iter().map(describe).collect();
        format!("enum={}", rendered.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_good_and_bad_values() {
        let cases = [
            (TypeTag::STR, json!("a string"), json!(5)),
            (TypeTag::INT, json!(5), json!("not an int")),
            (TypeTag::FLOAT, json!(4.2), json!(5)),
            (TypeTag::BOOL, json!(false), json!("not a bool")),
            (TypeTag::NULL, Value::Null, json!("not null")),
        ];
        for (tag, good, bad) in cases {
            let spec = Type::new(tag);
            assert_eq!(spec.check(&good).unwrap(), good, "value was mutated");
            let error = spec.check(&bad).unwrap_err();
            assert_eq!(error.kind, FailureKind::TypeMismatch);
        }
    }

    #[test]
    fn test_type_canonicalize() {
        let spec = Type::new(TypeTag::STR).map(|_| json!(5));
        assert_eq!(spec.check(&json!("some random string")).unwrap(), json!(5));

        let spec = Type::new(TypeTag::STR).try_map(|v| {
            v.as_str()
                .unwrap_or_default()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| e.to_string())
        });
        assert_eq!(spec.check(&json!("42")).unwrap(), json!(42));
        let error = spec.check(&json!("definitely not numeric")).unwrap_err();
        assert_eq!(error.kind, FailureKind::CanonicalizationFailed);
        assert!(error.message.starts_with("Canonicalization to str failed"));
    }

    #[test]
    fn test_type_constraints_run_before_canonicalization() {
        let spec = Type::new(TypeTag::STR)
            .with_constraint(Constraint::new(
                |v| v.as_str().map(|s| s.starts_with('x')).unwrap_or(false),
                "Must start with x",
            ))
            .map(|v| json!(v.as_str().unwrap_or_default().to_uppercase()));

        assert_eq!(spec.check(&json!("xyz")).unwrap(), json!("XYZ"));
        let error = spec.check(&json!("abc")).unwrap_err();
        assert_eq!(error.message, "Does not meet value constraint: Must start with x");
    }

    #[test]
    fn test_enum_spec_membership() {
        let good = [json!("a string"), json!(5), json!(6.4), json!([5, 4]), json!(null)];
        let spec = EnumSpec::new(good.clone()).unwrap();
        for value in &good {
            assert_eq!(&spec.check(value).unwrap(), value);
        }

        for value in [json!("another string"), json!(6), json!(7.5), json!([6, 5]), json!({"a": 1})] {
            let error = spec.check(&value).unwrap_err();
            assert_eq!(error.kind, FailureKind::NotEnumerated);
            assert!(error.message.starts_with("Must match enum="));
        }
    }

    #[test]
    fn test_enum_returns_stored_instance() {
        let spec = EnumSpec::new([json!(1), json!("b")]).unwrap();
        let canonical = spec.check(&json!(1.0)).unwrap();
        assert!(canonical.is_i64());
        assert_eq!(canonical, json!(1));
    }

    #[test]
    fn test_enum_duplicates_collapse() {
        let spec = EnumSpec::new([json!(1), json!(1.0), json!("x"), json!("x")]).unwrap();
        assert_eq!(spec.values(), &[json!(1), json!("x")]);
        assert_eq!(spec.type_name(), "enum=1/\"x\"");
    }

    #[test]
    fn test_enum_rejects_non_hashable_values() {
        let error = EnumSpec::new([json!("ok"), json!({"not": "hashable"})]).unwrap_err();
        assert!(matches!(error, SchemaError::NonHashableEnumValue { .. }));
    }
}
