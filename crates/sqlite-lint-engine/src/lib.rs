//! sqlite-lint engine - rule registry and evaluation
//!
//! - Built-in rule registry
//! - Rule evaluation over a normalized schema
//! - One-call linting of schema text or files

pub mod error;
pub mod rules;
pub mod evaluator;

pub use error::{LintError, RegistryError, RuleExecutionError};
pub use rules::{Rule, RuleRegistry};
pub use evaluator::{lint_file, lint_schema, Evaluator};
