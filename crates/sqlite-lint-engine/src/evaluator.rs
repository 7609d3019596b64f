//! Rule evaluator
//!
//! Runs rule queries against a normalized schema and collects their rows as
//! violations. The first rule that cannot execute aborts the whole run.

use std::path::Path;

use sqlite_lint_catalog::{Normalizer, NormalizedSchema, SchemaLoader};
use sqlite_lint_core::{RuleActivation, RuleOutcome, RunResult, Violation};
use tracing::{debug, info};

use crate::error::{LintError, RuleExecutionError};
use crate::rules::{Rule, RuleRegistry};

/// Columns every rule query must return
const RESULT_COLUMNS: [&str; 3] = ["error_msg", "table_name", "column_name"];

pub struct Evaluator;

impl Evaluator {
    /// Evaluate one rule; an empty result means it passed
    pub fn run(rule: &Rule, schema: &NormalizedSchema) -> Result<Vec<Violation>, RuleExecutionError> {
        let mut stmt = schema
            .connection()
            .prepare(rule.query)
            .map_err(|source| RuleExecutionError::Prepare {
                rule: rule.name.to_string(),
                source,
            })?;

        if !stmt.readonly() {
            return Err(RuleExecutionError::NotReadOnly {
                rule: rule.name.to_string(),
            });
        }

        let returned = stmt.column_names();
        if let Some(missing) = RESULT_COLUMNS.into_iter().find(|c| !returned.contains(c)) {
            return Err(RuleExecutionError::MissingColumn {
                rule: rule.name.to_string(),
                column: missing,
            });
        }

        let query_error = |source: rusqlite::Error| RuleExecutionError::Query {
            rule: rule.name.to_string(),
            source,
        };

        let violations = stmt
            .query_map([], |row| {
                Ok(Violation {
                    error_msg: row.get("error_msg")?,
                    table_name: row.get("table_name")?,
                    column_name: row.get::<_, Option<String>>("column_name")?.unwrap_or_default(),
                })
            })
            .map_err(query_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;

        debug!(rule = rule.name, violations = violations.len(), "rule evaluated");
        Ok(violations)
    }

    /// Evaluate every active rule in registry order
    ///
    /// Inactive rules are skipped and do not appear in the result.
    pub fn run_all(
        registry: &RuleRegistry,
        schema: &NormalizedSchema,
        activation: &RuleActivation,
    ) -> Result<RunResult, RuleExecutionError> {
        let mut result = RunResult::new();

        for rule in registry.iter() {
            if !activation.is_active(rule.name) {
                debug!(rule = rule.name, "rule disabled, skipping");
                continue;
            }

            let violations = Self::run(rule, schema)?;
            result.push(RuleOutcome::new(rule.name, rule.explanation, violations));
        }

        info!(
            rules = result.outcomes.len(),
            failed = result.failed().count(),
            violations = result.violation_count(),
            "lint run finished"
        );
        Ok(result)
    }
}

/// Load, normalize and lint schema text in one pass
pub fn lint_schema(
    schema: &str,
    registry: &RuleRegistry,
    activation: &RuleActivation,
) -> Result<RunResult, LintError> {
    let normalized = Normalizer::normalize(SchemaLoader::load_str(schema)?)?;
    Ok(Evaluator::run_all(registry, &normalized, activation)?)
}

/// Like [`lint_schema`], reading the schema from a file
pub fn lint_file(
    path: &Path,
    registry: &RuleRegistry,
    activation: &RuleActivation,
) -> Result<RunResult, LintError> {
    let normalized = Normalizer::normalize(SchemaLoader::load_file(path)?)?;
    Ok(Evaluator::run_all(registry, &normalized, activation)?)
}
