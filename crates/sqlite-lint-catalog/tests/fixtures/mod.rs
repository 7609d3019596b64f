//! Schema fixtures shared by the catalog integration tests
//!
//! The SQL files live in `fixtures/schemas` at the workspace root so the
//! engine tests can use the same inputs.

use std::path::{Path, PathBuf};

use sqlite_lint_catalog::{Normalizer, NormalizedSchema, SchemaLoader};

/// Absolute path of a schema fixture
pub fn schema_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/schemas")
        .join(name)
}

/// Load and normalize a schema fixture
pub fn normalize_fixture(name: &str) -> NormalizedSchema {
    let session = SchemaLoader::load_file(&schema_path(name))
        .unwrap_or_else(|e| panic!("failed to load {}: {}", name, e));
    Normalizer::normalize(session).unwrap_or_else(|e| panic!("failed to normalize {}: {}", name, e))
}
