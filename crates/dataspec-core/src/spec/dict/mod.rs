//! Mapping node with literal keys, typed keys and cross-references
//!
//! A [`DictSpec`] check runs in passes over one input mapping:
//!
//! 1. Conditional entries pick their case from the input, and the selected
//!    cases' literal entries join the mapping's own.
//! 2. Every input key is classified: literal entries by exact match first,
//!    then typed entries in declaration order (first matching key spec wins).
//! 3. Plain entries are checked against their value spec.
//! 4. Declared literal keys absent from the input are checked against `null`,
//!    which lets a `TypeSpec` default supply a value.
//! 5. [`Reference`] entries are resolved to copies of their target's
//!    canonical value by a bounded fixpoint.
//! 6. Cross checks and updates run against the canonical mapping once
//!    everything else has passed.
//!
//! Failures from every pass are aggregated into one error. The canonical
//! mapping lists input keys in input order, followed by declared keys that
//! were absent from the input, in declaration order.
//!
//! Copyright (c) 2025 Dataspec Team
//! Licensed under the Apache-2.0 license

mod conditional;
mod post;
mod resolver;


pub use conditional::ConditionalSpec;
pub use post::{CrossCheck, CrossTest, Update, UpdateFn};

use super::{EnumSpec, IterSpec, SeqSpec, Spec, SpecNode, Type, TypeSpec};
use crate::classifier::TypeTag;
use crate::constraint::{check_constraints, Constraint};
use crate::context::CheckContext;
use crate::error::{CheckResult, FailureKind, ValidationError, Violation};
use crate::value::{describe, key_string};
use post::PostStep;
use resolver::ReferenceGraph;
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// Directive: the entry's canonical value is a copy of another key's
/// canonical value in the same mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    target: String,
}

impl Reference {
    pub fn to<K: Into<String>>(target: K) -> Self {
        Self { target: target.into() }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Value side of a literal-keyed entry
#[derive(Debug, Clone)]
pub enum EntrySpec {
    Spec(SpecNode),
    Reference(Reference),
    Conditional(ConditionalSpec),
}

/// Value side of a typed-key entry
#[derive(Debug, Clone)]
pub enum TypedEntry {
    Spec(SpecNode),
    Reference(Reference),
}

impl From<Reference> for EntrySpec {
    fn from(reference: Reference) -> Self {
        EntrySpec::Reference(reference)
    }
}

impl From<Reference> for TypedEntry {
    fn from(reference: Reference) -> Self {
        TypedEntry::Reference(reference)
    }
}

impl From<ConditionalSpec> for EntrySpec {
    fn from(conditional: ConditionalSpec) -> Self {
        EntrySpec::Conditional(conditional)
    }
}

macro_rules! impl_into_entry {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for EntrySpec {
                fn from(spec: $ty) -> Self {
                    EntrySpec::Spec(SpecNode::from(spec))
                }
            }

            impl From<$ty> for TypedEntry {
                fn from(spec: $ty) -> Self {
                    TypedEntry::Spec(SpecNode::from(spec))
                }
            }
        )*
    };
}

impl_into_entry!(SpecNode, TypeTag, Type, EnumSpec, TypeSpec, IterSpec, SeqSpec, DictSpec);

fn missing_key(key: &str) -> Violation {
    Violation::new(
        FailureKind::MissingKey,
        format!("Missing required mapping key {:?}", key),
    )
}

fn prefixed(violation: Violation, prefix: Option<&str>) -> Violation {
    match prefix {
        Some(prefix) => Violation::new(violation.kind, format!("{}{}", prefix, violation.message)),
        None => violation,
    }
}

/// Mapping schema
#[derive(Debug, Clone)]
pub struct DictSpec {
    name: String,
    literal_entries: Vec<(String, EntrySpec)>,
    literal_index: HashMap<String, usize>,
    typed_entries: Vec<(SpecNode, TypedEntry)>,
    allow_unknown_keys: Option<bool>,
    post: Vec<PostStep>,
    constraints: Vec<Constraint>,
}

impl Default for DictSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl DictSpec {
    pub fn new() -> Self {
        Self {
            name: "dict".to_string(),
            literal_entries: Vec::new(),
            literal_index: HashMap::new(),
            typed_entries: Vec::new(),
            allow_unknown_keys: None,
            post: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Add a literal-keyed entry; re-adding a key replaces its entry in place
    pub fn key<K, E>(mut self, key: K, entry: E) -> Self
    where
        K: Into<String>,
        E: Into<EntrySpec>,
    {
        let key = key.into();
        let entry = entry.into();
        match self.literal_index.get(&key) {
            Some(&i) => self.literal_entries[i].1 = entry,
            None => {
                self.literal_index.insert(key.clone(), self.literal_entries.len());
                self.literal_entries.push((key, entry));
            }
        }
        self
    }

    /// Add a typed-key entry, tried in declaration order for unmatched keys
    pub fn typed_key<K, E>(mut self, key_spec: K, entry: E) -> Self
    where
        K: Into<SpecNode>,
        E: Into<TypedEntry>,
    {
        self.typed_entries.push((key_spec.into(), entry.into()));
        self
    }

    /// Name used in messages
    pub fn named<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Override the configured unknown-key policy for this mapping
    pub fn allow_unknown_keys(mut self, allow: bool) -> Self {
        self.allow_unknown_keys = Some(allow);
        self
    }

    pub fn with_cross_check(mut self, check: CrossCheck) -> Self {
        self.post.push(PostStep::Check(check));
        self
    }

    /// Updates run interleaved with cross checks, in the order both were added
    pub fn with_update(mut self, update: Update) -> Self {
        self.post.push(PostStep::Update(update));
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn literal(&self, key: &str) -> Option<&EntrySpec> {
        self.literal_index.get(key).map(|&i| &self.literal_entries[i].1)
    }

    /// First typed entry whose key spec accepts `key`, with the canonical key
    fn classify_typed(&self, key: &str, context: &CheckContext<'_>) -> Option<(String, &TypedEntry)> {
        let raw_key = Value::String(key.to_string());
        let key_context = context.child(key);
        self.typed_entries.iter().find_map(|(key_spec, entry)| {
            key_spec
                .check_in(&raw_key, &key_context)
                .ok()
                .map(|c_key| (key_string(&c_key), entry))
        })
    }

    fn valid_keys(&self, plan: &Plan<'_>) -> String {
        let literal = plan.entries.iter().map(|p| format!("{:?}", p.key));
        let typed = self.typed_entries.iter().map(|(k, _)| k.type_name());
        literal.chain(typed).collect::<Vec<_>>().join(", ")
    }

    /// Literal entries and post steps that apply to `input`
    ///
    /// Conditional entries are expanded as they are reached, so a selected
    /// case may itself contain conditionals. A case key that is already
    /// planned keeps its first entry.
    fn plan<'s>(&'s self, input: &Map<String, Value>) -> Plan<'s> {
        let mut plan = Plan {
            entries: Vec::with_capacity(self.literal_entries.len()),
            index: HashMap::new(),
            post: Vec::new(),
        };
        for (key, entry) in &self.literal_entries {
            plan.push(key, entry, None, 0);
        }

        let mut case_steps: Vec<(usize, &'s PostStep, Option<String>)> = Vec::new();
        let mut i = 0;
        while i < plan.entries.len() {
            let (key, entry, depth) = (plan.entries[i].key, plan.entries[i].entry, plan.entries[i].depth);
            if let EntrySpec::Conditional(conditional) = entry {
                let (selection, case) = match input.get(key) {
                    Some(raw) => match conditional.case(raw) {
                        Some((value, case)) => (Ok(value.clone()), Some((value, case))),
                        None => (
                            Err(Violation::new(
                                FailureKind::NotEnumerated,
                                format!(
                                    "Invalid value for key {:?}: Must be one of: {}",
                                    key,
                                    conditional.case_values()
                                ),
                            )),
                            None,
                        ),
                    },
                    None => match conditional.default_value() {
                        Some(default) => (Ok(default.clone()), conditional.default_case()),
                        None => (Err(missing_key(key)), None),
                    },
                };

                if let Some((value, case)) = case {
                    let prefix = format!(
                        "{}Invalid value for key {:?}: Does not conform with conditional spec for value {}: ",
                        plan.entries[i].prefix.as_deref().unwrap_or_default(),
                        key,
                        describe(value)
                    );
                    for (case_key, case_entry) in &case.literal_entries {
                        if plan.index.contains_key(case_key.as_str()) {
                            tracing::debug!(key = %case_key, "conditional case entry shadowed by an existing entry");
                            continue;
                        }
                        plan.push(case_key, case_entry, Some(prefix.clone()), depth + 1);
                    }
                    case_steps.extend(case.post.iter().map(|step| (depth + 1, step, Some(prefix.clone()))));
                }
                plan.entries[i].selection = Some(selection);
            }
            i += 1;
        }

        // innermost cases first, mirroring the order their checks complete in
        case_steps.sort_by_key(|(depth, _, _)| Reverse(*depth));
        plan.post = case_steps
            .into_iter()
            .map(|(_, step, prefix)| (step, prefix))
            .chain(self.post.iter().map(|step| (step, None)))
            .collect();
        plan
    }
}

/// Literal entries in effect for one check
struct Plan<'s> {
    entries: Vec<Planned<'s>>,
    index: HashMap<&'s str, usize>,
    post: Vec<(&'s PostStep, Option<String>)>,
}

impl<'s> Plan<'s> {
    fn push(&mut self, key: &'s str, entry: &'s EntrySpec, prefix: Option<String>, depth: usize) {
        self.index.insert(key, self.entries.len());
        self.entries.push(Planned {
            key,
            entry,
            prefix,
            depth,
            selection: None,
        });
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }
}

struct Planned<'s> {
    key: &'s str,
    entry: &'s EntrySpec,
    /// Message prefix for entries contributed by a conditional case
    prefix: Option<String>,
    /// Conditional nesting level, 0 for the mapping's own entries
    depth: usize,
    /// Outcome of a conditional entry, decided while planning
    selection: Option<Result<Value, Violation>>,
}

enum Outcome<'s> {
    Value(Value),
    Reference(&'s str),
    Failed(Violation),
}

impl<'s> Planned<'s> {
    /// Check the entry against its input value, or against its absence
    fn check(&self, raw: Option<&Value>, context: &CheckContext<'_>) -> Outcome<'s> {
        let key = self.key;
        let result = match (self.entry, raw) {
            (EntrySpec::Reference(reference), _) => return Outcome::Reference(&reference.target),
            (EntrySpec::Spec(spec), Some(raw)) => spec
                .check_in(raw, &context.child(key))
                .map_err(|error| error.into_violation_with(|m| format!("Invalid value for key {:?}: {}", key, m))),
            (EntrySpec::Spec(spec), None) => spec
                .check_in(&Value::Null, &context.child(key))
                .map_err(|_| missing_key(key)),
            (EntrySpec::Conditional(_), _) => self.selection.clone().unwrap_or_else(|| Err(missing_key(key))),
        };
        match result {
            Ok(c_value) => Outcome::Value(c_value),
            Err(violation) => Outcome::Failed(prefixed(violation, self.prefix.as_deref())),
        }
    }
}

/// Canonical values and output order accumulated during one check
#[derive(Default)]
struct Canonical {
    order: Vec<String>,
    values: HashMap<String, Value>,
}

impl Canonical {
    fn reserve_slot(&mut self, key: &str) {
        if !self.order.iter().any(|k| k == key) {
            self.order.push(key.to_string());
        }
    }

    fn insert(&mut self, key: String, value: Value) {
        self.reserve_slot(&key);
        self.values.insert(key, value);
    }

    fn into_map(mut self) -> Map<String, Value> {
        let mut map = Map::new();
        for key in self.order {
            if let Some(value) = self.values.remove(&key) {
                map.insert(key, value);
            }
        }
        map
    }
}

impl Spec for DictSpec {
    fn check_in(&self, value: &Value, context: &CheckContext<'_>) -> CheckResult<Value> {
        let entries = context.classifier().entries(value).ok_or_else(|| {
            ValidationError::new(FailureKind::NotAMapping, &context.path, "Must be mapping/dict")
        })?;
        let allow_unknown = self
            .allow_unknown_keys
            .unwrap_or(context.config().allow_unknown_keys);

        let plan = self.plan(entries);
        let mut violations = Vec::new();
        let mut canonical = Canonical::default();
        let mut references = ReferenceGraph::new();
        let mut seen = vec![false; plan.entries.len()];
        let mut typed_keys: HashSet<String> = HashSet::new();

        for (key, raw) in entries {
            if let Some(i) = plan.position(key) {
                seen[i] = true;
                match plan.entries[i].check(Some(raw), context) {
                    Outcome::Value(c_value) => canonical.insert(key.clone(), c_value),
                    Outcome::Reference(target) => {
                        tracing::trace!(key = %key, target = %target, "input value replaced by reference");
                        canonical.reserve_slot(key);
                        references.push(key.clone(), target);
                    }
                    Outcome::Failed(violation) => violations.push(violation),
                }
                continue;
            }

            match self.classify_typed(key, context) {
                Some((c_key, _)) if plan.position(&c_key).is_some() || !typed_keys.insert(c_key.clone()) => {
                    violations.push(Violation::new(
                        FailureKind::KeyCollision,
                        format!("Key {:?} collides with key {:?} after canonicalization", key, c_key),
                    ))
                }
                Some((c_key, TypedEntry::Spec(spec))) => match spec.check_in(raw, &context.child(key)) {
                    Ok(c_value) => canonical.insert(c_key, c_value),
                    Err(error) => violations.push(error.into_violation_with(|m| {
                        format!("Value for key {:?} does not conform with spec: {}", key, m)
                    })),
                },
                Some((c_key, TypedEntry::Reference(reference))) => {
                    canonical.reserve_slot(&c_key);
                    references.push(c_key, reference.target.clone());
                }
                None if allow_unknown => {
                    tracing::debug!(key = %key, path = %context.path, "dropping unknown key");
                }
                None => violations.push(Violation::new(
                    FailureKind::UnexpectedKey,
                    format!("Key {:?} is unhandled; valid keys: {}", key, self.valid_keys(&plan)),
                )),
            }
        }

        for (planned, _) in plan.entries.iter().zip(&seen).filter(|(_, done)| !**done) {
            match planned.check(None, context) {
                Outcome::Value(c_value) => canonical.insert(planned.key.to_string(), c_value),
                Outcome::Reference(target) => {
                    canonical.reserve_slot(planned.key);
                    references.push(planned.key, target);
                }
                Outcome::Failed(violation) => violations.push(violation),
            }
        }

        let pass_limit = context.config().pass_limit(references.len());
        for unresolved in references.resolve(&mut canonical.values, pass_limit) {
            violations.push(Violation::new(
                FailureKind::UnresolvableReference,
                format!(
                    "Unresolvable reference for key {:?} to key {:?}: {}",
                    unresolved.key,
                    unresolved.target,
                    unresolved.cause.reason()
                ),
            ));
        }

        if violations.is_empty() {
            for (step, prefix) in &plan.post {
                if let Err(violation) = step.run(&mut canonical.values) {
                    violations.push(prefixed(violation, prefix.as_deref()));
                }
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError::aggregate(
                FailureKind::MappingInvalid,
                &context.path,
                format!("Does not conform with {} schema", self.name),
                violations,
            ));
        }

        let canonical = Value::Object(canonical.into_map());
        check_constraints(&self.constraints, &canonical, context)?;
        Ok(canonical)
    }

    fn type_name(&self) -> String {
        self.name.clone()
    }
}
