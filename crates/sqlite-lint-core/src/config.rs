//! Configuration schema (sqlite-lint.toml) and rule activation
//!
//! ```toml
//! [rules]
//! require_strict = false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Prefix GitHub Actions puts in front of action inputs
const INPUT_ENV_PREFIX: &str = "INPUT_";

/// Per-run "is this rule active" input
///
/// Rules without an entry are active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleActivation {
    overrides: HashMap<String, bool>,
}

impl RuleActivation {
    /// Every rule active
    pub fn all_active() -> Self {
        Self::default()
    }

    /// Whether a rule runs
    pub fn is_active(&self, rule: &str) -> bool {
        self.overrides.get(rule).copied().unwrap_or(true)
    }

    /// Set a rule's activation
    pub fn set(&mut self, rule: impl Into<String>, active: bool) {
        self.overrides.insert(rule.into(), active);
    }

    /// Builder form of [`RuleActivation::set`]
    pub fn with(mut self, rule: impl Into<String>, active: bool) -> Self {
        self.set(rule, active);
        self
    }

    /// Override activation from `INPUT_<RULE>` variables
    ///
    /// `lookup` resolves a variable name; unset variables leave the rule
    /// untouched and any value except `false` activates it.
    pub fn apply_env<'a, F>(&mut self, rules: impl IntoIterator<Item = &'a str>, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for rule in rules {
            if let Some(value) = lookup(&input_env_var(rule)) {
                self.set(rule, value != "false");
            }
        }
    }
}

/// Environment variable GitHub Actions uses for an input of this name
///
/// Hyphens and spaces become underscores and the result is upper-cased.
pub fn input_env_var(name: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect();
    format!("{}{}", INPUT_ENV_PREFIX, normalized.to_uppercase())
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Rule name to enabled flag
    #[serde(default)]
    pub rules: BTreeMap<String, bool>,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Activation as configured in the file
    pub fn activation(&self) -> RuleActivation {
        let mut activation = RuleActivation::all_active();
        for (rule, enabled) in &self.rules {
            activation.set(rule.clone(), *enabled);
        }
        activation
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
