//! Post-processing over a mapping's canonical values
//!
//! Steps run in declaration order once every entry of the mapping is valid.
//! A [`CrossCheck`] reports a failure; an [`Update`] rewrites the value of its
//! first key, and later steps observe the rewritten value.

use crate::error::{FailureKind, SchemaError, Violation};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Predicate over the canonical values of several keys, in key order
pub type CrossTest = Arc<dyn Fn(&[&Value]) -> bool + Send + Sync>;

/// Replacement value computed from the canonical values of several keys
pub type UpdateFn = Arc<dyn Fn(&[&Value]) -> Value + Send + Sync>;

fn collect_keys<I, K>(keys: I) -> Result<Vec<String>, SchemaError>
where
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    if keys.is_empty() {
        return Err(SchemaError::EmptyCrossCheck);
    }
    Ok(keys)
}

fn lookup<'v>(keys: &[String], canonical: &'v HashMap<String, Value>) -> Result<Vec<&'v Value>, Violation> {
    let mut values = Vec::with_capacity(keys.len());
    let mut missing = Vec::new();
    for key in keys {
        match canonical.get(key) {
            Some(value) => values.push(value),
            None => missing.push(format!("{:?}", key)),
        }
    }
    if missing.is_empty() {
        Ok(values)
    } else {
        Err(Violation::new(
            FailureKind::CrossCheckFailed,
            format!("Missing reference keys {}", missing.join(", ")),
        ))
    }
}

/// Test over several canonical values
#[derive(Clone)]
pub struct CrossCheck {
    keys: Vec<String>,
    test: CrossTest,
    message: String,
}

impl CrossCheck {
    pub fn new<I, K, F, M>(keys: I, test: F, message: M) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&[&Value]) -> bool + Send + Sync + 'static,
        M: Into<String>,
    {
        Ok(Self {
            keys: collect_keys(keys)?,
            test: Arc::new(test),
            message: message.into(),
        })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    fn evaluate(&self, canonical: &HashMap<String, Value>) -> Result<(), Violation> {
        let values = lookup(&self.keys, canonical)?;
        if (self.test)(&values) {
            Ok(())
        } else {
            Err(Violation::new(FailureKind::CrossCheckFailed, self.message.clone()))
        }
    }
}

impl fmt::Debug for CrossCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossCheck")
            .field("keys", &self.keys)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Rewrite of the first key's canonical value, computed from all the keys
///
/// The gate sees the same values as the update; when it returns `false` the
/// mapping is left untouched. Without a gate the update always applies.
#[derive(Clone)]
pub struct Update {
    keys: Vec<String>,
    update: UpdateFn,
    gate: Option<CrossTest>,
}

impl Update {
    pub fn new<I, K, F>(keys: I, update: F) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(&[&Value]) -> Value + Send + Sync + 'static,
    {
        Ok(Self {
            keys: collect_keys(keys)?,
            update: Arc::new(update),
            gate: None,
        })
    }

    pub fn with_gate<F>(mut self, gate: F) -> Self
    where
        F: Fn(&[&Value]) -> bool + Send + Sync + 'static,
    {
        self.gate = Some(Arc::new(gate));
        self
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns whether the gate let the update through
    fn apply(&self, canonical: &mut HashMap<String, Value>) -> Result<bool, Violation> {
        let values = lookup(&self.keys, canonical)?;
        if let Some(gate) = &self.gate {
            if !gate(&values) {
                return Ok(false);
            }
        }
        let updated = (self.update)(&values);
        canonical.insert(self.keys[0].clone(), updated);
        Ok(true)
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("keys", &self.keys)
            .field("gated", &self.gate.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum PostStep {
    Check(CrossCheck),
    Update(Update),
}

impl PostStep {
    pub fn run(&self, canonical: &mut HashMap<String, Value>) -> Result<(), Violation> {
        match self {
            PostStep::Check(check) => check.evaluate(canonical),
            PostStep::Update(update) => {
                let applied = update.apply(canonical)?;
                tracing::trace!(key = %update.keys[0], applied, "post-processing update");
                Ok(())
            }
        }
    }
}
