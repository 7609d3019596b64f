//! Lint violations
//!
//! A violation is expected, informational data produced by a rule. It is
//! never an error: rules that fail to execute surface a separate error type.

use serde::{Deserialize, Serialize};

/// One row flagged by a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Violation {
    /// Human-readable message
    pub error_msg: String,

    /// Table the violation belongs to
    pub table_name: String,

    /// Offending column (empty for table-level violations)
    #[serde(default)]
    pub column_name: String,
}

impl Violation {
    /// Create a column-level violation
    pub fn new(
        error_msg: impl Into<String>,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Self {
            error_msg: error_msg.into(),
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    /// Create a table-level violation
    pub fn for_table(error_msg: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self::new(error_msg, table_name, String::new())
    }

    /// Whether this violation concerns a whole table rather than a column
    pub fn is_table_level(&self) -> bool {
        self.column_name.is_empty()
    }

    /// `table.column`, or just `table` for table-level violations
    pub fn location(&self) -> String {
        if self.is_table_level() {
            self.table_name.clone()
        } else {
            format!("{}.{}", self.table_name, self.column_name)
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_msg, self.location())
    }
}
