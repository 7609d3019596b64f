//! Engine errors

use sqlite_lint_catalog::LoadError;

/// A rule predicate could not be evaluated
///
/// Always fatal for the run: a rule that cannot execute must never be
/// reported as passing.
#[derive(Debug, thiserror::Error)]
pub enum RuleExecutionError {
    #[error("failed to prepare rule '{rule}': {source}")]
    Prepare {
        rule: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to execute rule '{rule}': {source}")]
    Query {
        rule: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("rule '{rule}' is not a read-only query")]
    NotReadOnly { rule: String },

    #[error("rule '{rule}' does not return a '{column}' column")]
    MissingColumn { rule: String, column: &'static str },
}

impl RuleExecutionError {
    /// Name of the failing rule
    pub fn rule(&self) -> &str {
        match self {
            Self::Prepare { rule, .. }
            | Self::Query { rule, .. }
            | Self::NotReadOnly { rule }
            | Self::MissingColumn { rule, .. } => rule,
        }
    }
}

/// Registry construction errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("rule '{0}' is registered more than once")]
    DuplicateRule(String),
}

/// Any fatal failure of a lint run
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Rule(#[from] RuleExecutionError),
}
