//! Load errors

use std::path::PathBuf;

/// Fatal failure while loading or normalizing a schema
///
/// No partial catalog is ever exposed alongside one of these.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read schema file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open in-memory database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("failed to execute schema: {0}")]
    Execute(#[source] rusqlite::Error),

    #[error("failed to introspect schema: {0}")]
    Introspect(#[source] rusqlite::Error),

    #[error("foreign key on {table}.{column} is only partially resolved")]
    InconsistentForeignKey { table: String, column: String },
}
