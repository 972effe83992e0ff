//! Dataspec Core - runtime schema validation and canonicalization
//!
//! This crate checks arbitrary runtime values against a declarative schema
//! tree, normalizes accepted values into a canonical form, and reports every
//! violation found in one aggregated error.
//!
//! ## Features
//!
//! - **Schema Nodes**: simple types, enumerations, unions with defaults,
//!   homogeneous iterables, fixed-arity sequences and mappings
//! - **Cross-references**: mapping entries that copy another key's canonical value
//! - **Conditional Entries**: a key's value selects further entries of its mapping
//! - **Post-processing**: cross checks and updates over a valid mapping
//! - **Pluggable Classification**: the simple-type catalog is a [`TypeClassifier`]
//! - **Aggregated Errors**: one [`ValidationError`] per check with flattened
//!   child messages
//!
//! ## Quick Start
//!
//! ```rust
//! use dataspec_core::{DictSpec, Reference, Spec, TypeSpec, TypeTag};
//! use serde_json::json;
//!
//! let spec = DictSpec::new()
//!     .key("port", TypeTag::INT)
//!     .key("admin_port", Reference::to("port"))
//!     .key("host", TypeSpec::new([TypeTag::STR]).unwrap().with_default("localhost"));
//!
//! let canonical = spec.check(&json!({"port": 8080})).unwrap();
//! assert_eq!(canonical, json!({"port": 8080, "admin_port": 8080, "host": "localhost"}));
//!
//! match spec.check(&json!({"port": "eighty"})) {
//!     Ok(_) => unreachable!(),
//!     Err(e) => println!("Validation error: {}", e),
//! }
//! ```
//!
//! ## Checking With a Policy
//!
//! [`Checker`] binds a classifier and a [`CheckConfig`]. [`Spec::check`] uses
//! [`JsonClassifier`] and the default (strict) policy.
//!
//! Copyright (c) 2025 Dataspec Team
//! Licensed under the Apache-2.0 license

pub mod classifier;
pub mod config;
pub mod constraint;
pub mod context;
pub mod error;
pub mod spec;
pub mod value;

// Re-export commonly used types for convenience
pub use classifier::{JsonClassifier, TypeClassifier, TypeTag};
pub use config::CheckConfig;
pub use constraint::{Constraint, Validator};
pub use context::{CheckContext, Checker};
pub use error::{CheckResult, ConfigError, FailureKind, SchemaError, ValidationError, Violation};
pub use spec::{
    Alternative, Canonicalizer, Collection, ConditionalSpec, CrossCheck, DictSpec, EntrySpec, EnumSpec,
    IterSpec, Literal, Reference, SeqSpec, Spec, SpecNode, Type, TypeSpec, TypedEntry, UnsetPredicate,
    Update,
};
pub use value::{is_null_or_empty, is_semantically_empty, ValueKey};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
