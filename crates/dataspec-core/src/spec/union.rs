//! Union of alternatives with default substitution
//!
//! A [`TypeSpec`] first asks its "use default" predicate whether the raw value
//! is unset. If so, the configured default is returned as-is. Otherwise each
//! alternative is tried in declaration order and the first success wins.

use super::{DictSpec, EnumSpec, IterSpec, SeqSpec, Spec, SpecNode, Type};
use crate::classifier::TypeTag;
use crate::constraint::{check_constraints, Constraint};
use crate::context::CheckContext;
use crate::error::{CheckResult, FailureKind, SchemaError, ValidationError};
use crate::value::is_semantically_empty;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether a raw value should be replaced by the default
pub type UnsetPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Literal singleton markers usable as alternatives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    True,
    False,
    Absent,
}

impl Literal {
    pub fn value(&self) -> Value {
        match self {
            Literal::True => Value::Bool(true),
            Literal::False => Value::Bool(false),
            Literal::Absent => Value::Null,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Literal::True, Value::Bool(true))
                | (Literal::False, Value::Bool(false))
                | (Literal::Absent, Value::Null)
        )
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::True => f.write_str("true"),
            Literal::False => f.write_str("false"),
            Literal::Absent => f.write_str("null"),
        }
    }
}

/// One member of a [`TypeSpec`] union
#[derive(Debug, Clone)]
pub enum Alternative {
    /// Matches only the identical marker value
    Literal(Literal),
    /// Simple type, checked as a bare `Type` with no canonicalizer
    Tag(TypeTag),
    /// Nested node
    Spec(SpecNode),
}

impl Alternative {
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value> {
        match self {
            Alternative::Literal(literal) => {
                if literal.matches(value) {
                    Ok(literal.value())
                } else {
                    Err(ValidationError::new(
                        FailureKind::TypeMismatch,
                        &context.path,
                        format!("Must be {}", literal),
                    ))
                }
            }
            Alternative::Tag(tag) => Type::new(tag.clone()).check_in(value, context),
            Alternative::Spec(spec) => spec.check_in(value, context),
        }
    }

    fn type_name(&self) -> String {
        match self {
            Alternative::Literal(literal) => literal.to_string(),
            Alternative::Tag(tag) => tag.to_string(),
            Alternative::Spec(spec) => spec.type_name(),
        }
    }
}

impl From<Literal> for Alternative {
    fn from(literal: Literal) -> Self {
        Alternative::Literal(literal)
    }
}

impl From<TypeTag> for Alternative {
    fn from(tag: TypeTag) -> Self {
        Alternative::Tag(tag)
    }
}

impl From<SpecNode> for Alternative {
    fn from(spec: SpecNode) -> Self {
        Alternative::Spec(spec)
    }
}

macro_rules! impl_into_alternative {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Alternative {
                fn from(spec: $ty) -> Self {
                    Alternative::Spec(SpecNode::from(spec))
                }
            }
        )*
    };
}

impl_into_alternative!(Type, EnumSpec, TypeSpec, IterSpec, SeqSpec, DictSpec);

/// Union of alternatives with an optional default
#[derive(Clone)]
pub struct TypeSpec {
    alternatives: Vec<Alternative>,
    default: Option<Value>,
    use_default: UnsetPredicate,
    constraints: Vec<Constraint>,
}

impl TypeSpec {
    pub fn new<I>(alternatives: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator,
        I::Item: Into<Alternative>,
    {
        let alternatives: Vec<Alternative> = alternatives.into_iter().map(Into::into).collect();
        if alternatives.is_empty() {
            return Err(SchemaError::EmptyAlternatives);
        }
        Ok(Self {
            alternatives,
            default: None,
            use_default: Arc::new(is_semantically_empty),
            constraints: Vec::new(),
        })
    }

    /// Value returned whenever the "use default" predicate holds
    pub fn with_default<V: Into<Value>>(mut self, default: V) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Replace the "use default" predicate
    pub fn with_unset_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.use_default = Arc::new(predicate);
        self
    }

    /// Accept the absent marker, defaulting to `null` unless a default is set
    pub fn optional(mut self) -> Self {
        let has_absent = self
            .alternatives
            .iter()
            .any(|a| matches!(a, Alternative::Literal(Literal::Absent)));
        if !has_absent {
            self.alternatives.push(Alternative::Literal(Literal::Absent));
        }
        if self.default.is_none() {
            self.default = Some(Value::Null);
        }
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

impl Spec for TypeSpec {
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value> {
        if let Some(default) = &self.default {
            if (self.use_default)(value) {
                return Ok(default.clone());
            }
        }

        let mut violations = Vec::with_capacity(self.alternatives.len());
        for alternative in &self.alternatives {
            match alternative.check_in(value, context) {
                Ok(canonical) => {
                    check_constraints(&self.constraints, &canonical, context)?;
                    return Ok(canonical);
                }
                Err(error) => violations.push(match alternative {
                    Alternative::Spec(spec) => {
                        error.into_violation_with(|m| format!("{}: {}", spec.type_name(), m))
                    }
                    _ => error.into_violation(),
                }),
            }
        }

        Err(ValidationError::aggregate(
            FailureKind::NoAlternativeMatched,
            &context.path,
            format!(
                "Must be one of: {}",
                self.alternatives
                    .iter()
                    .map(Alternative::type_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            violations,
        ))
    }

    fn type_name(&self) -> String {
        self.alternatives
            .iter()
            .map(Alternative::type_name)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSpec")
            .field("alternatives", &self.alternatives)
            .field("default", &self.default)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}
