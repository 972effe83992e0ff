//! Entries whose value selects further entries of the same mapping
//!
//! A [`ConditionalSpec`] sits under a literal key. Its value must equal one of
//! the case values; the matching case's literal entries are then checked
//! against the same input mapping and their keys count as handled. The key's
//! canonical value is the stored case value.

use super::DictSpec;
use crate::error::SchemaError;
use crate::value::{describe, ValueKey};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ConditionalSpec {
    cases: Vec<(Value, DictSpec)>,
    index: HashMap<ValueKey, usize>,
    default: Option<Value>,
    apply_default_case: bool,
}

impl ConditionalSpec {
    /// Build from `(value, case)` pairs; a repeated value keeps its first case
    pub fn new<I, V>(cases: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (V, DictSpec)>,
        V: Into<Value>,
    {
        let mut stored = Vec::new();
        let mut index = HashMap::new();
        for (value, case) in cases {
            let value = value.into();
            let key = ValueKey::of(&value).ok_or_else(|| SchemaError::NonHashableConditionValue {
                value: describe(&value),
            })?;
            if !case.typed_entries.is_empty() {
                return Err(SchemaError::ConditionalTypedKeys {
                    value: describe(&value),
                });
            }
            if !index.contains_key(&key) {
                index.insert(key, stored.len());
                stored.push((value, case));
            }
        }
        if stored.is_empty() {
            return Err(SchemaError::EmptyConditional);
        }

        Ok(Self {
            cases: stored,
            index,
            default: None,
            apply_default_case: false,
        })
    }

    /// Value used when the key is absent; without one the key is required
    pub fn with_default<V: Into<Value>>(mut self, default: V) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Also apply the default's case when the key is absent
    ///
    /// The default (`null` when none was set) must be one of the case values.
    pub fn apply_default_case(mut self) -> Result<Self, SchemaError> {
        let default = self.default.take().unwrap_or(Value::Null);
        if self.case(&default).is_none() {
            return Err(SchemaError::UnknownConditionalDefault {
                value: describe(&default),
            });
        }
        self.default = Some(default);
        self.apply_default_case = true;
        Ok(self)
    }

    /// Stored case value and case spec matching `value`
    pub fn case(&self, value: &Value) -> Option<(&Value, &DictSpec)> {
        let key = ValueKey::of(value)?;
        self.index.get(&key).map(|&i| (&self.cases[i].0, &self.cases[i].1))
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(super) fn default_case(&self) -> Option<(&Value, &DictSpec)> {
        if !self.apply_default_case {
            return None;
        }
        self.default.as_ref().and_then(|default| self.case(default))
    }

    pub(super) fn case_values(&self) -> String {
        self.cases
            .iter()
            .map(|(value, _)| describe(value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
