//! Value constraints attached to spec nodes

use crate::context::CheckContext;
use crate::error::{CheckResult, FailureKind, ValidationError, Violation};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate over a value, returning `false` if the constraint is not met
pub type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A named predicate applied to a node's matched value
#[derive(Clone)]
pub struct Constraint {
    test: Validator,
    message: String,
}

impl Constraint {
    pub fn new<F, M>(test: F, message: M) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
        M: Into<String>,
    {
        Self {
            test: Arc::new(test),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether `value` satisfies the constraint
    pub fn evaluate(&self, value: &Value) -> bool {
        (self.test)(value)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Evaluate every constraint, aggregating all failures
pub(crate) fn check_constraints(
    constraints: &[Constraint],
    value: &Value,
    context: &CheckContext<'_>,
) -> CheckResult<()> {
    let failures: Vec<&Constraint> = constraints.iter().filter(|c| !c.evaluate(value)).collect();
    match failures.as_slice() {
        [] => Ok(()),
        [only] if constraints.len() == 1 => Err(ValidationError::new(
            FailureKind::ConstraintViolation,
            &context.path,
            format!("Does not meet value constraint: {}", only.message),
        )),
        _ => Err(ValidationError::aggregate(
            FailureKind::ConstraintViolation,
            &context.path,
            "Does not meet value constraints",
            failures
                .into_iter()
                .map(|c| Violation::new(FailureKind::ConstraintViolation, c.message.clone()))
                .collect(),
        )),
    }
}
