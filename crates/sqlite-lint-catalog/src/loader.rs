//! Schema loader
//!
//! Every load gets its own in-memory database, so repeated runs in one
//! process (a test suite, for instance) never see each other's tables.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::error::LoadError;

/// A freshly loaded schema, ready for normalization
#[derive(Debug)]
pub struct Session {
    conn: Connection,
}

impl Session {
    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Executes schema-definition text against an isolated engine instance
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load schema text into a new in-memory database
    pub fn load_str(schema: &str) -> Result<Session, LoadError> {
        let conn = Connection::open_in_memory().map_err(LoadError::Open)?;

        conn.execute_batch(schema).map_err(LoadError::Execute)?;

        debug!(bytes = schema.len(), "schema loaded");
        Ok(Session { conn })
    }

    /// Read a schema file and load it
    pub fn load_file(path: &Path) -> Result<Session, LoadError> {
        let schema = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "read schema file");
        Self::load_str(&schema)
    }
}
