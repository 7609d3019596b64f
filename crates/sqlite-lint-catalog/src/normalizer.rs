//! Metadata normalizer
//!
//! Derives the canonical relations from SQLite's pragma table-valued
//! functions and exposes them as TEMP views, so the user's `main` schema is
//! left untouched:
//!
//! - `lint_tables(name, strict_typing, uses_rowid)`
//! - `lint_columns(table_name, column_name, position, declared_type, nullable,
//!   has_default, primary_key_ordinal, fk_target_table, fk_target_column)`
//! - `lint_foreign_keys(table_name, column_name, position, constraint_id,
//!   fk_target_table, fk_target_column)`, one row per constraint
//! - `lint_index_coverage(table_name, column_name)`
//!
//! Only ordinary tables are user tables: virtual tables can be neither
//! STRICT nor keyed, so they are left out along with `sqlite_*` tables.
//!
//! This is the only module that knows about pragmas. Rule predicates query
//! the views above and nothing else.

use rusqlite::{Connection, Row};
use sqlite_lint_core::{
    Catalog, CatalogColumn, CatalogForeignKey, CatalogTable, ColumnRef, ForeignKeyTarget,
};
use tracing::debug;

use crate::error::LoadError;
use crate::loader::Session;

/// View definitions for the canonical relations
const CANONICAL_VIEWS: &str = r#"
create temp view lint_tables as
    select l.name as name,
           l."strict" as strict_typing,
           not l.wr as uses_rowid
      from pragma_table_list as l
     where l."schema" = 'main'
       and l."type" = 'table'
       and l.name not like 'sqlite\_%' escape '\';

-- One row per foreign key constraint. A foreign key that only names its
-- parent table targets the parent's primary key column at the same
-- position, falling back to rowid.
create temp view lint_foreign_keys as
    select t.name as table_name,
           c.name as column_name,
           c.cid as position,
           fk.id as constraint_id,
           fk."table" as fk_target_table,
           coalesce(
               fk."to",
               (select p.name
                  from pragma_table_info(fk."table") as p
                 where p.pk = fk.seq + 1),
               'rowid') as fk_target_column
      from lint_tables as t
      join pragma_table_info(t.name) as c
      join pragma_foreign_key_list(t.name) as fk
        on fk."from" = c.name collate nocase;

-- One row per column. A column in several foreign keys keeps the
-- constraint with the lowest id; lint_foreign_keys has all of them.
create temp view lint_columns as
    select t.name as table_name,
           c.name as column_name,
           c.cid as position,
           c."type" as declared_type,
           not c."notnull" as nullable,
           c.dflt_value is not null as has_default,
           c.pk as primary_key_ordinal,
           fk.fk_target_table as fk_target_table,
           fk.fk_target_column as fk_target_column
      from lint_tables as t
      join pragma_table_info(t.name) as c
      left join lint_foreign_keys as fk
             on fk.table_name = t.name
            and fk.position = c.cid
            and fk.constraint_id = (select min(f.constraint_id)
                                      from lint_foreign_keys as f
                                     where f.table_name = t.name
                                       and f.position = c.cid);

create temp view lint_index_coverage as
    select t.name as table_name,
           i.name as column_name
      from lint_tables as t
      join pragma_index_list(t.name) as l
      join pragma_index_info(l.name) as i
     where i.name is not null

     union

    select table_name,
           column_name
      from lint_columns
     where column_name = 'rowid' collate nocase
       and primary_key_ordinal > 0;
"#;

/// A loaded schema with its canonical relations in place
///
/// The connection is `query_only`: nothing run against it can change the
/// schema, so the materialized [`Catalog`] stays in sync for the whole run.
#[derive(Debug)]
pub struct NormalizedSchema {
    conn: Connection,
    catalog: Catalog,
}

impl NormalizedSchema {
    /// Frozen snapshot of the canonical relations
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Read-only connection exposing the canonical views
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}

/// Builds the canonical relations for a loaded session
pub struct Normalizer;

impl Normalizer {
    /// Create the canonical views, freeze the session and snapshot it
    pub fn normalize(session: Session) -> Result<NormalizedSchema, LoadError> {
        let conn = session.into_connection();

        conn.execute_batch(CANONICAL_VIEWS).map_err(LoadError::Introspect)?;
        conn.execute_batch("pragma query_only = on;").map_err(LoadError::Introspect)?;

        let catalog = Catalog {
            tables: read_tables(&conn)?,
            columns: read_columns(&conn)?,
            foreign_keys: read_foreign_keys(&conn)?,
            index_coverage: read_index_coverage(&conn)?,
        };

        debug!(
            tables = catalog.tables.len(),
            columns = catalog.columns.len(),
            foreign_keys = catalog.foreign_keys.len(),
            covered = catalog.index_coverage.len(),
            "schema normalized"
        );

        Ok(NormalizedSchema { conn, catalog })
    }
}

fn read_tables(conn: &Connection) -> Result<Vec<CatalogTable>, LoadError> {
    let mut stmt = conn
        .prepare("select name, strict_typing, uses_rowid from lint_tables order by name")
        .map_err(LoadError::Introspect)?;

    let tables = stmt
        .query_map([], |row| {
            Ok(CatalogTable {
                name: row.get(0)?,
                strict_typing: row.get(1)?,
                uses_rowid: row.get(2)?,
            })
        })
        .map_err(LoadError::Introspect)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(LoadError::Introspect)?;

    Ok(tables)
}

/// Raw `lint_columns` row before the foreign key pair is checked
struct RawColumn {
    column: CatalogColumn,
    fk_target_table: Option<String>,
    fk_target_column: Option<String>,
}

impl RawColumn {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let column = CatalogColumn::new(
            row.get::<_, String>("table_name")?,
            row.get::<_, String>("column_name")?,
        )
        .with_position(row.get("position")?)
        .with_type(row.get::<_, String>("declared_type")?)
        .with_nullable(row.get("nullable")?)
        .with_default(row.get("has_default")?)
        .with_primary_key_ordinal(row.get("primary_key_ordinal")?);

        Ok(Self {
            column,
            fk_target_table: row.get("fk_target_table")?,
            fk_target_column: row.get("fk_target_column")?,
        })
    }

    fn resolve(self) -> Result<CatalogColumn, LoadError> {
        let RawColumn { mut column, fk_target_table, fk_target_column } = self;
        match (fk_target_table, fk_target_column) {
            (Some(table), Some(target)) => {
                column = column.with_foreign_key(ForeignKeyTarget::new(table, target));
            }
            (None, None) => {}
            _ => {
                return Err(LoadError::InconsistentForeignKey {
                    table: column.table_name,
                    column: column.column_name,
                })
            }
        }
        Ok(column)
    }
}

fn read_columns(conn: &Connection) -> Result<Vec<CatalogColumn>, LoadError> {
    let mut stmt = conn
        .prepare(
            "select table_name, column_name, position, declared_type, nullable, has_default,
                    primary_key_ordinal, fk_target_table, fk_target_column
               from lint_columns
              order by table_name, position",
        )
        .map_err(LoadError::Introspect)?;

    let raw = stmt
        .query_map([], RawColumn::from_row)
        .map_err(LoadError::Introspect)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(LoadError::Introspect)?;

    raw.into_iter().map(RawColumn::resolve).collect()
}

fn read_foreign_keys(conn: &Connection) -> Result<Vec<CatalogForeignKey>, LoadError> {
    // constraint ids count down from the last declared constraint
    let mut stmt = conn
        .prepare(
            "select table_name, column_name, fk_target_table, fk_target_column
               from lint_foreign_keys
              order by table_name, position, constraint_id desc",
        )
        .map_err(LoadError::Introspect)?;

    let foreign_keys = stmt
        .query_map([], |row| {
            Ok(CatalogForeignKey::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                ForeignKeyTarget::new(row.get::<_, String>(2)?, row.get::<_, String>(3)?),
            ))
        })
        .map_err(LoadError::Introspect)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(LoadError::Introspect)?;

    Ok(foreign_keys)
}

fn read_index_coverage(conn: &Connection) -> Result<Vec<ColumnRef>, LoadError> {
    let mut stmt = conn
        .prepare(
            "select table_name, column_name
               from lint_index_coverage
              order by table_name, column_name",
        )
        .map_err(LoadError::Introspect)?;

    let coverage = stmt
        .query_map([], |row| Ok(ColumnRef::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(LoadError::Introspect)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(LoadError::Introspect)?;

    Ok(coverage)
}
