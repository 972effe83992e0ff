//! Schema node kinds
//!
//! Every node implements [`Spec`]: given a raw value it either returns a fresh
//! canonical value or a single aggregated [`ValidationError`](crate::ValidationError).
//! Composite nodes check all of their children before deciding, so one check
//! reports every violation it can find.
//!
//! - `leaf`: [`Type`] and [`EnumSpec`]
//! - `union`: [`TypeSpec`] and its [`Alternative`] kinds
//! - `sequence`: [`IterSpec`] and [`SeqSpec`]
//! - `dict`: [`DictSpec`], [`Reference`], [`ConditionalSpec`] and cross-reference resolution
//!
//! Copyright (c) 2025 Dataspec Team
//! Licensed under the Apache-2.0 license

pub mod dict;
pub mod leaf;
pub mod sequence;
pub mod union;


pub use dict::{ConditionalSpec, CrossCheck, DictSpec, EntrySpec, Reference, TypedEntry, Update};
pub use leaf::{Canonicalizer, EnumSpec, Type};
pub use sequence::{Collection, IterSpec, SeqSpec};
pub use union::{Alternative, Literal, TypeSpec, UnsetPredicate};

use crate::classifier::{JsonClassifier, TypeTag};
use crate::config::CheckConfig;
use crate::context::CheckContext;
use crate::error::CheckResult;
use serde_json::Value;
use std::fmt;

/// Capability shared by all schema nodes
pub trait Spec: fmt::Debug + Send + Sync {
    /// Check `value` within an existing context
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value>;

    /// Short name used in messages
    fn type_name(&self) -> String;

    /// Check `value` with the JSON classifier and default policy
    fn check(&self, value: &Value) -> CheckResult<Value> {
        let config = CheckConfig::default();
        let context = CheckContext::new(&JsonClassifier, &config);
        self.check_in(value, &context)
    }
}

/// A schema tree node
#[derive(Debug, Clone)]
pub enum SpecNode {
    Type(Type),
    Enum(EnumSpec),
    Union(TypeSpec),
    Iter(IterSpec),
    Seq(SeqSpec),
    Dict(DictSpec),
}

impl Spec for SpecNode {
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value> {
        match self {
            SpecNode::Type(spec) => spec.check_in(value, context),
            SpecNode::Enum(spec) => spec.check_in(value, context),
            SpecNode::Union(spec) => spec.check_in(value, context),
            SpecNode::Iter(spec) => spec.check_in(value, context),
            SpecNode::Seq(spec) => spec.check_in(value, context),
            SpecNode::Dict(spec) => spec.check_in(value, context),
        }
    }

    fn type_name(&self) -> String {
        match self {
            SpecNode::Type(spec) => spec.type_name(),
            SpecNode::Enum(spec) => spec.type_name(),
            SpecNode::Union(spec) => spec.type_name(),
            SpecNode::Iter(spec) => spec.type_name(),
            SpecNode::Seq(spec) => spec.type_name(),
            SpecNode::Dict(spec) => spec.type_name(),
        }
    }
}

impl From<TypeTag> for SpecNode {
    fn from(tag: TypeTag) -> Self {
        SpecNode::Type(Type::new(tag))
    }
}

macro_rules! impl_into_node {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for SpecNode {
                fn from(spec: $ty) -> Self {
                    SpecNode::$variant(spec)
                }
            }
        )*
    };
}

impl_into_node!(
    Type(Type),
    Enum(EnumSpec),
    Union(TypeSpec),
    Iter(IterSpec),
    Seq(SeqSpec),
    Dict(DictSpec),
);
