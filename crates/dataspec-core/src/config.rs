//! Check policy configuration
//!
//! Configuration can be built programmatically, loaded from a YAML or JSON
//! file, and overridden from environment variables:
//!
//! ```yaml
//! allow_unknown_keys: false
//! reference_pass_limit: 8
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`CheckConfig::allow_unknown_keys`]
pub const ENV_ALLOW_UNKNOWN_KEYS: &str = "DATASPEC_ALLOW_UNKNOWN_KEYS";
/// Environment variable overriding [`CheckConfig::reference_pass_limit`]
pub const ENV_REFERENCE_PASS_LIMIT: &str = "DATASPEC_REFERENCE_PASS_LIMIT";

/// Policy applied while checking values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Accept mapping keys that match no entry; such keys are dropped from the
    /// canonical output. A `DictSpec` may override this for itself.
    pub allow_unknown_keys: bool,

    /// Upper bound on reference resolution passes per mapping. The effective
    /// bound is never larger than the number of reference entries and never
    /// smaller than one. Loaded configurations reject `0`.
    pub reference_pass_limit: Option<usize>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            allow_unknown_keys: false,
            reference_pass_limit: None,
        }
    }
}

impl CheckConfig {
    /// Reject unknown mapping keys
    pub fn strict() -> Self {
        Self::default()
    }

    /// Drop unknown mapping keys instead of failing
    pub fn lenient() -> Self {
        Self {
            allow_unknown_keys: true,
            ..Self::default()
        }
    }

    pub fn with_allow_unknown_keys(mut self, allow: bool) -> Self {
        self.allow_unknown_keys = allow;
        self
    }

    pub fn with_reference_pass_limit(mut self, limit: usize) -> Self {
        self.reference_pass_limit = Some(limit);
        self
    }

    /// Effective pass cap for a mapping with `reference_count` references
    pub fn pass_limit(&self, reference_count: usize) -> usize {
        match self.reference_pass_limit {
            Some(limit) => limit.max(1).min(reference_count),
            None => reference_count,
        }
    }

    /// Load configuration from a file
    ///
    /// `.yaml` and `.yml` files are parsed as YAML, anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let extension = path.extension().and_then(|s| s.to_str());
        let config = if extension == Some("yaml") || extension == Some("yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        validate(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(allow) = std::env::var(ENV_ALLOW_UNKNOWN_KEYS) {
            self.allow_unknown_keys = parse_flag(&allow).ok_or_else(|| {
                ConfigError::Invalid(format!("{} must be a boolean, got {:?}", ENV_ALLOW_UNKNOWN_KEYS, allow))
            })?;
        }

        if let Ok(limit) = std::env::var(ENV_REFERENCE_PASS_LIMIT) {
            let limit = limit.trim().parse::<usize>().map_err(|e| {
                ConfigError::Invalid(format!("{} must be a non-negative integer: {}", ENV_REFERENCE_PASS_LIMIT, e))
            })?;
            self.reference_pass_limit = Some(limit);
        }

        validate(self)
    }
}

fn validate(config: &CheckConfig) -> Result<(), ConfigError> {
    if config.reference_pass_limit == Some(0) {
        return Err(ConfigError::Invalid(
            "reference_pass_limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
