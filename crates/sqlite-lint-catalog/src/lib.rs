//! Schema loading and metadata normalization
//!
//! Turns schema-definition text into the canonical catalog relations the
//! rule engine runs against.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlite_lint_catalog::{Normalizer, SchemaLoader};
//!
//! let session = SchemaLoader::load_str("create table users (email text not null) strict;")?;
//! let normalized = Normalizer::normalize(session)?;
//! assert_eq!(normalized.catalog().tables.len(), 1);
//! ```

pub mod error;
pub mod loader;
pub mod normalizer;

pub use error::LoadError;
pub use loader::{SchemaLoader, Session};
pub use normalizer::{NormalizedSchema, Normalizer};

/// Load schema text and normalize it in one step
pub fn load_catalog(schema: &str) -> Result<NormalizedSchema, LoadError> {
    Normalizer::normalize(SchemaLoader::load_str(schema)?)
}
