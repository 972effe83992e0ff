//! Check context and the top-level [`Checker`]
//!
//! Copyright (c) 2025 Dataspec Team
//! Licensed under the Apache-2.0 license

use crate::classifier::{JsonClassifier, TypeClassifier};
use crate::config::CheckConfig;
use crate::error::CheckResult;
use crate::spec::Spec;
use serde_json::Value;
use std::sync::Arc;

/// Per-node context threaded through a check
///
/// Carries the classifier, the policy and the path of the node being checked.
/// Contexts are cheap to derive and never shared between checks.
#[derive(Clone)]
pub struct CheckContext<'a> {
    /// Current value path
    pub path: String,
    classifier: &'a dyn TypeClassifier,
    config: &'a CheckConfig,
}

impl<'a> CheckContext<'a> {
    /// Create a root context
    pub fn new(classifier: &'a dyn TypeClassifier, config: &'a CheckConfig) -> Self {
        Self {
            path: "$".to_string(),
            classifier,
            config,
        }
    }

    /// Create a child context for a mapping key
    pub fn child<P: AsRef<str>>(&self, key: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, key.as_ref()),
            classifier: self.classifier,
            config: self.config,
        }
    }

    /// Create a child context for a sequence index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            classifier: self.classifier,
            config: self.config,
        }
    }

    pub fn classifier(&self) -> &'a dyn TypeClassifier {
        self.classifier
    }

    pub fn config(&self) -> &'a CheckConfig {
        self.config
    }
}

impl std::fmt::Debug for CheckContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckContext")
            .field("path", &self.path)
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// Binds a classifier and a policy for checking values against specs
#[derive(Clone)]
pub struct Checker {
    classifier: Arc<dyn TypeClassifier>,
    config: CheckConfig,
}

impl Checker {
    /// Checker with the JSON classifier and default policy
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(JsonClassifier),
            config: CheckConfig::default(),
        }
    }

    pub fn with_classifier<C: TypeClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check `value` against `spec`, returning its canonical form
    pub fn check<S: Spec + ?Sized>(&self, spec: &S, value: &Value) -> CheckResult<Value> {
        let span = tracing::debug_span!("check", spec = %spec.type_name());
        let _guard = span.enter();

        let context = CheckContext::new(self.classifier.as_ref(), &self.config);
        let result = spec.check_in(value, &context);
        if let Err(error) = &result {
            tracing::debug!(
                kind = %error.kind,
                error_count = error.error_count(),
                "check failed"
            );
        }
        result
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_paths() {
        let config = CheckConfig::default();
        let context = CheckContext::new(&JsonClassifier, &config);
        assert_eq!(context.path, "$");

        let child = context.child("servers");
        assert_eq!(child.path, "$.servers");

        let indexed = child.child_index(2).child("port");
        assert_eq!(indexed.path, "$.servers[2].port");
    }

    #[test]
    fn test_checker_carries_config() {
        let checker = Checker::new().with_config(CheckConfig::lenient());
        assert!(checker.config().allow_unknown_keys);
    }
}
