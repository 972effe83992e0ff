//! Container nodes: homogeneous iterables and fixed-arity sequences

use super::{Spec, SpecNode};
use crate::constraint::{check_constraints, Constraint};
use crate::context::CheckContext;
use crate::error::{CheckResult, FailureKind, SchemaError, ValidationError};
use crate::value::values_equal;
use serde_json::Value;

/// Canonical collection produced by an [`IterSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collection {
    /// Elements in input order
    #[default]
    List,
    /// Elements in input order with later duplicates removed
    Set,
}

/// Every element checked against one element spec, with optional count bounds
#[derive(Debug, Clone)]
pub struct IterSpec {
    element: Box<SpecNode>,
    min_count: Option<usize>,
    max_count: Option<usize>,
    collection: Collection,
    constraints: Vec<Constraint>,
}

impl IterSpec {
    pub fn new<S: Into<SpecNode>>(element: S) -> Self {
        Self {
            element: Box::new(element.into()),
            min_count: None,
            max_count: None,
            collection: Collection::List,
            constraints: Vec::new(),
        }
    }

    /// Bound the canonical element count
    pub fn with_count(mut self, min: Option<usize>, max: Option<usize>) -> Result<Self, SchemaError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(SchemaError::InvalidCountBounds { min, max });
            }
        }
        self.min_count = min;
        self.max_count = max;
        Ok(self)
    }

    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collection = collection;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn element(&self) -> &SpecNode {
        &self.element
    }

    fn check_count(&self, count: usize, context: &CheckContext<'_>) -> CheckResult<()> {
        let message = match (self.min_count, self.max_count) {
            (Some(min), _) if count < min => format!("Must have at least {} items, found {}", min, count),
            (_, Some(max)) if count > max => format!("Must have at most {} items, found {}", max, count),
            _ => return Ok(()),
        };
        Err(ValidationError::new(FailureKind::CountOutOfRange, &context.path, message))
    }
}

impl Spec for IterSpec {
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value> {
        let elements = context.classifier().elements(value).ok_or_else(|| {
            ValidationError::new(FailureKind::NotIterable, &context.path, "Must be iterable")
        })?;

        let mut canonical = Vec::with_capacity(elements.len());
        let mut violations = Vec::new();
        for (i, element) in elements.iter().enumerate() {
            match self.element.check_in(element, &context.child_index(i)) {
                Ok(c_value) => canonical.push(c_value),
                Err(error) => {
                    violations.push(error.into_violation_with(|m| format!("Index {} is invalid: {}", i, m)))
                }
            }
        }
        if !violations.is_empty() {
            return Err(ValidationError::aggregate(
                FailureKind::ItemsInvalid,
                &context.path,
                "Items do not conform with iterable spec",
                violations,
            ));
        }

        if self.collection == Collection::Set {
            let mut unique: Vec<Value> = Vec::with_capacity(canonical.len());
            for item in canonical {
                if !unique.iter().any(|u| values_equal(u, &item)) {
                    unique.push(item);
                }
            }
            canonical = unique;
        }

        self.check_count(canonical.len(), context)?;
        let canonical = Value::Array(canonical);
        check_constraints(&self.constraints, &canonical, context)?;
        Ok(canonical)
    }

    fn type_name(&self) -> String {
        let kind = match self.collection {
            Collection::List => "list",
            Collection::Set => "set",
        };
        format!("{}[{}]", kind, self.element.type_name())
    }
}

/// Fixed-arity sequence, one spec per position
#[derive(Debug, Clone)]
pub struct SeqSpec {
    positions: Vec<SpecNode>,
    constraints: Vec<Constraint>,
}

impl SeqSpec {
    pub fn new<I>(positions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SpecNode>,
    {
        Self {
            positions: positions.into_iter().map(Into::into).collect(),
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Spec for SeqSpec {
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value> {
        let elements = context.classifier().elements(value).ok_or_else(|| {
            ValidationError::new(FailureKind::NotASequence, &context.path, "Must be Sequence type")
        })?;

        if elements.len() != self.positions.len() {
            return Err(ValidationError::new(
                FailureKind::LengthMismatch,
                &context.path,
                format!(
                    "Sequence must have exactly {} elements, found {}",
                    self.positions.len(),
                    elements.len()
                ),
            ));
        }

        let mut canonical = Vec::with_capacity(elements.len());
        let mut violations = Vec::new();
        for (i, (spec, element)) in self.positions.iter().zip(elements).enumerate() {
            match spec.check_in(element, &context.child_index(i)) {
                Ok(c_value) => canonical.push(c_value),
                Err(error) => violations
                    .push(error.into_violation_with(|m| format!("Sequence index {} is invalid: {}", i, m))),
            }
        }
        if !violations.is_empty() {
            return Err(ValidationError::aggregate(
                FailureKind::SequenceInvalid,
                &context.path,
                "Sequence does not conform with spec",
                violations,
            ));
        }

        let canonical = Value::Array(canonical);
        check_constraints(&self.constraints, &canonical, context)?;
        Ok(canonical)
    }

    fn type_name(&self) -> String {
        let names: Vec<String> = self.positions.iter().map(|p| p.type_name()).collect();
        format!("sequence({})", names.join(", "))
    }
}
