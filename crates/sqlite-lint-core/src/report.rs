//! Run results and the report schema (stable v1)
//!
//! The report schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::violation::Violation;

/// Violations produced by a single rule during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Registered rule name
    pub rule: String,

    /// Why the rule exists
    pub explanation: String,

    /// Flagged rows (empty when the rule passed)
    pub violations: Vec<Violation>,
}

impl RuleOutcome {
    pub fn new(
        rule: impl Into<String>,
        explanation: impl Into<String>,
        violations: Vec<Violation>,
    ) -> Self {
        Self {
            rule: rule.into(),
            explanation: explanation.into(),
            violations,
        }
    }

    /// A rule passes when it flagged nothing
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Outcome of one lint run, ordered by rule registration
///
/// Only active rules appear. Never persisted across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub outcomes: Vec<RuleOutcome>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of the next rule
    pub fn push(&mut self, outcome: RuleOutcome) {
        self.outcomes.push(outcome);
    }

    /// Outcome of a rule, if it ran
    pub fn get(&self, rule: &str) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| o.rule == rule)
    }

    /// Violations of a rule, if it ran
    pub fn violations(&self, rule: &str) -> Option<&[Violation]> {
        self.get(rule).map(|o| o.violations.as_slice())
    }

    /// Rules that flagged at least one row
    pub fn failed(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    /// Names of the rules that ran
    pub fn rule_names(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.rule.as_str()).collect()
    }

    pub fn violation_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.violations.len()).sum()
    }

    /// True when every rule that ran passed
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RuleOutcome::passed)
    }
}

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of rules that ran
    pub rules_checked: usize,

    /// Number of rules with at least one violation
    pub rules_failed: usize,

    /// Total number of violations
    pub violations: usize,
}

/// Lint report (report.json v1)
///
/// This is the stable machine-readable output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Linted schema file, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Per-rule outcomes in rule order
    pub rules: Vec<RuleOutcome>,
}

impl Report {
    /// Create a report from a finished run
    pub fn from_run(result: RunResult) -> Self {
        let summary = ReportSummary {
            rules_checked: result.outcomes.len(),
            rules_failed: result.failed().count(),
            violations: result.violation_count(),
        };

        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            schema: None,
            summary,
            rules: result.outcomes,
        }
    }

    /// Attach the schema file name
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Check if any rule failed
    pub fn has_failures(&self) -> bool {
        self.summary.rules_failed > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
