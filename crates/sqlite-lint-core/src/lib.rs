//! sqlite-lint core
//!
//! Engine-agnostic domain model shared by the loader, the rule engine and the
//! reporter. Rule names and report fields are part of the public API:
//! never rename them, only add new ones.

pub mod violation;
pub mod catalog;
pub mod report;
pub mod config;

pub use violation::Violation;
pub use catalog::{Catalog, CatalogColumn, CatalogForeignKey, CatalogTable, ColumnRef, ForeignKeyTarget};
pub use report::{Report, ReportSummary, ReportVersion, RuleOutcome, RunResult};
pub use config::{Config, ConfigError, RuleActivation};
