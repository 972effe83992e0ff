//! Error types for schema checking and schema construction
//!
//! Check-time failures are reported as a single aggregated [`ValidationError`].
//! Composite nodes flatten each child failure into a [`Violation`] record and
//! drop the child error itself, so the outermost error only ever carries
//! messages, never nested errors.
//!
//! Copyright (c) 2025 Dataspec Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The semantic category of a check failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Value is not of the simple type a `Type` wraps
    TypeMismatch,
    /// Value is not one of the enumerated literals
    NotEnumerated,
    /// No `TypeSpec` alternative accepted the value
    NoAlternativeMatched,
    /// A canonicalizer rejected an otherwise matching value
    CanonicalizationFailed,
    /// A value constraint was not met
    ConstraintViolation,
    /// `IterSpec` input is not iterable
    NotIterable,
    /// One or more `IterSpec` elements failed
    ItemsInvalid,
    /// `IterSpec` element count is outside the configured bounds
    CountOutOfRange,
    /// `SeqSpec` input is not a sequence
    NotASequence,
    /// `SeqSpec` input has the wrong number of elements
    LengthMismatch,
    /// One or more `SeqSpec` positions failed
    SequenceInvalid,
    /// `DictSpec` input is not a mapping
    NotAMapping,
    /// Input key matched neither a literal nor a typed key entry
    UnexpectedKey,
    /// Required literal key is absent and has no usable default
    MissingKey,
    /// A typed key's canonical form equals a key already in the mapping
    KeyCollision,
    /// A `Reference` could not be resolved
    UnresolvableReference,
    /// A cross-key check failed
    CrossCheckFailed,
    /// One or more `DictSpec` entries failed
    MappingInvalid,
}

impl FailureKind {
    /// Stable snake_case name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::TypeMismatch => "type_mismatch",
            FailureKind::NotEnumerated => "not_enumerated",
            FailureKind::NoAlternativeMatched => "no_alternative_matched",
            FailureKind::CanonicalizationFailed => "canonicalization_failed",
            FailureKind::ConstraintViolation => "constraint_violation",
            FailureKind::NotIterable => "not_iterable",
            FailureKind::ItemsInvalid => "items_invalid",
            FailureKind::CountOutOfRange => "count_out_of_range",
            FailureKind::NotASequence => "not_a_sequence",
            FailureKind::LengthMismatch => "length_mismatch",
            FailureKind::SequenceInvalid => "sequence_invalid",
            FailureKind::NotAMapping => "not_a_mapping",
            FailureKind::UnexpectedKey => "unexpected_key",
            FailureKind::MissingKey => "missing_key",
            FailureKind::KeyCollision => "key_collision",
            FailureKind::UnresolvableReference => "unresolvable_reference",
            FailureKind::CrossCheckFailed => "cross_check_failed",
            FailureKind::MappingInvalid => "mapping_invalid",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flattened child failure: its kind and its full message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Kind of the failure that produced this record
    pub kind: FailureKind,
    /// The child failure's combined message
    pub message: String,
}

impl Violation {
    /// Create a new violation record
    pub fn new<M: Into<String>>(kind: FailureKind, message: M) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Aggregated check failure
///
/// `summary` is the headline for the node that failed. `message` is the
/// human-readable rendering: the summary alone for leaf failures, or the
/// summary followed by one `-- ` line per violation for composite failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Kind of the failure
    pub kind: FailureKind,
    /// Path of the node that failed (`$`, `$.key`, `$[0]`, ...)
    pub path: String,
    /// Headline message without child details
    pub summary: String,
    /// Combined human-readable message
    pub message: String,
    /// Flattened child failures, in the order they were found
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Create a leaf failure with no child violations
    pub fn new<P, M>(kind: FailureKind, path: P, summary: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        let summary = summary.into();
        Self {
            kind,
            path: path.into(),
            message: summary.clone(),
            summary,
            violations: Vec::new(),
        }
    }

    /// Create a composite failure from flattened child violations
    pub fn aggregate<P, M>(kind: FailureKind, path: P, summary: M, violations: Vec<Violation>) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        let summary = summary.into();
        let message = render_message(&summary, &violations);
        Self {
            kind,
            path: path.into(),
            summary,
            message,
            violations,
        }
    }

    /// Flatten this error into a violation record for an enclosing node,
    /// discarding the error itself
    pub fn into_violation(self) -> Violation {
        Violation {
            kind: self.kind,
            message: self.message,
        }
    }

    /// Flatten this error with a context prefix on its message
    pub fn into_violation_with<F>(self, prefix: F) -> Violation
    where
        F: FnOnce(&str) -> String,
    {
        Violation {
            kind: self.kind,
            message: prefix(&self.message),
        }
    }

    /// Messages of the direct child failures
    pub fn child_messages(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.message.as_str()).collect()
    }

    /// Child messages, or this error's own message for a leaf failure
    pub fn messages(&self) -> Vec<&str> {
        if self.violations.is_empty() {
            vec![self.message.as_str()]
        } else {
            self.child_messages()
        }
    }

    /// Number of messages reported by [`ValidationError::messages`]
    pub fn error_count(&self) -> usize {
        self.violations.len().max(1)
    }

    /// Whether any direct child failure has the given kind
    pub fn has_violation(&self, kind: FailureKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}

fn render_message(summary: &str, violations: &[Violation]) -> String {
    if violations.is_empty() {
        return summary.to_string();
    }
    let lines: Vec<String> = violations
        .iter()
        .map(|v| v.message.split('\n').collect::<Vec<_>>().join("\n   "))
        .collect();
    format!("{}:\n-- {}", summary, lines.join("\n-- "))
}

/// Result type for check operations
pub type CheckResult<T> = Result<T, ValidationError>;

/// Errors raised while building a schema tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An enumerated value cannot serve as a stable key
    #[error("EnumSpec value {value} is not hashable")]
    NonHashableEnumValue { value: String },

    /// `IterSpec` bounds with `min > max`
    #[error("Invalid count bounds: min {min} is greater than max {max}")]
    InvalidCountBounds { min: usize, max: usize },

    /// `TypeSpec` built without any alternative
    #[error("TypeSpec requires at least one alternative")]
    EmptyAlternatives,

    /// Cross check or update built without any key
    #[error("At least one key must be specified for a cross check or update")]
    EmptyCrossCheck,

    #[error("ConditionalSpec requires at least one case")]
    EmptyConditional,

    #[error("Conditional case value {value} is not hashable")]
    NonHashableConditionValue { value: String },

    /// Case specs are matched by literal keys only
    #[error("Typed keys are not allowed in the conditional spec for value {value}")]
    ConditionalTypedKeys { value: String },

    #[error("Conditional default {value} has no matching case")]
    UnknownConditionalDefault { value: String },
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_error_message() {
        let error = ValidationError::new(FailureKind::TypeMismatch, "$", "Must be int");
        assert_eq!(error.message, "Must be int");
        assert_eq!(error.to_string(), "Must be int");
        assert!(error.child_messages().is_empty());
        assert_eq!(error.messages(), vec!["Must be int"]);
        assert_eq!(error.error_count(), 1);
    }

    #[test]
    fn test_aggregate_message_rendering() {
        let nested = ValidationError::aggregate(
            FailureKind::ItemsInvalid,
            "$[1]",
            "Items do not conform with iterable spec",
            vec![Violation::new(FailureKind::TypeMismatch, "Index 0 is invalid: Must be int")],
        );
        let error = ValidationError::aggregate(
            FailureKind::SequenceInvalid,
            "$",
            "Sequence does not conform with spec",
            vec![
                Violation::new(FailureKind::TypeMismatch, "Sequence index 0 is invalid: Must be str"),
                nested.into_violation_with(|m| format!("Sequence index 1 is invalid: {}", m)),
            ],
        );

        assert_eq!(
            error.message,
            "Sequence does not conform with spec:\n\
             -- Sequence index 0 is invalid: Must be str\n\
             -- Sequence index 1 is invalid: Items do not conform with iterable spec:\n   \
             -- Index 0 is invalid: Must be int"
        );
        assert_eq!(error.error_count(), 2);
        assert!(error.has_violation(FailureKind::ItemsInvalid));
        assert!(!error.has_violation(FailureKind::MissingKey));
    }

    #[test]
    fn test_failure_kind_serialization() {
        let json = serde_json::to_string(&FailureKind::UnresolvableReference).unwrap();
        assert_eq!(json, "\"unresolvable_reference\"");
        assert_eq!(FailureKind::CountOutOfRange.to_string(), "count_out_of_range");
    }

    #[test]
    fn test_schema_error_display() {
        let error = SchemaError::InvalidCountBounds { min: 3, max: 1 };
        assert_eq!(error.to_string(), "Invalid count bounds: min 3 is greater than max 1");

        let error = SchemaError::ConditionalTypedKeys { value: "\"tcp\"".to_string() };
        assert_eq!(
            error.to_string(),
            "Typed keys are not allowed in the conditional spec for value \"tcp\""
        );
    }
}
