//! Normalized schema catalog
//!
//! Engine-agnostic view of a loaded schema. Rules and reporters only ever see
//! these relations, never the engine's native introspection shapes.

use serde::{Deserialize, Serialize};

/// A user-defined table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogTable {
    /// Table name
    pub name: String,

    /// Whether the engine enforces declared column types on write
    pub strict_typing: bool,

    /// Whether rows carry an implicit rowid
    pub uses_rowid: bool,
}

impl CatalogTable {
    /// Create a table entry
    pub fn new(name: impl Into<String>, strict_typing: bool, uses_rowid: bool) -> Self {
        Self {
            name: name.into(),
            strict_typing,
            uses_rowid,
        }
    }
}

/// Declared target of a foreign key
///
/// Table and column are resolved together, so a half-resolved reference
/// cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyTarget {
    /// Referenced table, verbatim as declared
    pub table: String,

    /// Referenced column, verbatim as declared
    pub column: String,
}

impl ForeignKeyTarget {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A column of a user-defined table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogColumn {
    /// Owning table
    pub table_name: String,

    /// Column name
    pub column_name: String,

    /// Declaration index within the table (0-based)
    pub position: u32,

    /// Declared type text (empty when no type was declared)
    ///
    /// Verbatim for ordinary tables. STRICT tables report the canonical
    /// upper-case type name (`int` becomes `INT`).
    pub declared_type: String,

    /// Whether NULL is accepted
    pub nullable: bool,

    /// Whether a default value is declared
    pub has_default: bool,

    /// 0 when not part of the primary key, else the 1-based key position
    pub primary_key_ordinal: u32,

    /// Foreign key target, if this column references another table
    pub foreign_key: Option<ForeignKeyTarget>,
}

impl CatalogColumn {
    /// Create a nullable, untyped, non-key column
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            position: 0,
            declared_type: String::new(),
            nullable: true,
            has_default: false,
            primary_key_ordinal: 0,
            foreign_key: None,
        }
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, has_default: bool) -> Self {
        self.has_default = has_default;
        self
    }

    pub fn with_primary_key_ordinal(mut self, ordinal: u32) -> Self {
        self.primary_key_ordinal = ordinal;
        self
    }

    pub fn with_foreign_key(mut self, target: ForeignKeyTarget) -> Self {
        self.foreign_key = Some(target);
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key_ordinal > 0
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }

    pub fn fk_target_table(&self) -> Option<&str> {
        self.foreign_key.as_ref().map(|fk| fk.table.as_str())
    }

    pub fn fk_target_column(&self) -> Option<&str> {
        self.foreign_key.as_ref().map(|fk| fk.column.as_str())
    }
}

/// One foreign key constraint on one column
///
/// Unlike [`CatalogColumn::foreign_key`], a column that takes part in
/// several constraints has one entry per constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogForeignKey {
    /// Referencing table
    pub table_name: String,

    /// Referencing column
    pub column_name: String,

    /// Referenced pair
    pub target: ForeignKeyTarget,
}

impl CatalogForeignKey {
    pub fn new(
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        target: ForeignKeyTarget,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            target,
        }
    }
}

/// A `(table, column)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table_name: String,
    pub column_name: String,
}

impl ColumnRef {
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    /// Identifier comparison, ASCII case-insensitive like SQLite's
    pub fn matches(&self, table_name: &str, column_name: &str) -> bool {
        self.table_name.eq_ignore_ascii_case(table_name)
            && self.column_name.eq_ignore_ascii_case(column_name)
    }
}

/// Frozen snapshot of a normalized schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// User tables ordered by name
    pub tables: Vec<CatalogTable>,

    /// Columns ordered by table name, then declaration position
    pub columns: Vec<CatalogColumn>,

    /// Every foreign key constraint, ordered like `columns` and then by
    /// declaration order
    pub foreign_keys: Vec<CatalogForeignKey>,

    /// Pairs covered by an index or an explicit rowid primary key
    pub index_coverage: Vec<ColumnRef>,
}

impl Catalog {
    /// Find a column by table and column name
    pub fn column(&self, table_name: &str, column_name: &str) -> Option<&CatalogColumn> {
        self.columns
            .iter()
            .find(|c| c.table_name == table_name && c.column_name == column_name)
    }

    /// Columns of one table, in declaration order
    pub fn columns_of<'a, 'n>(
        &'a self,
        table_name: &'n str,
    ) -> impl Iterator<Item = &'a CatalogColumn> + 'n
    where
        'a: 'n,
    {
        self.columns.iter().filter(move |c| c.table_name == table_name)
    }

    /// Primary key columns of a table, ordered by key position
    pub fn primary_key(&self, table_name: &str) -> Vec<&CatalogColumn> {
        let mut key: Vec<_> = self
            .columns
            .iter()
            .filter(|c| c.table_name == table_name && c.is_primary_key())
            .collect();
        key.sort_by_key(|c| c.primary_key_ordinal);
        key
    }

    /// Foreign key constraints declared by one table
    pub fn foreign_keys_of<'a, 'n>(
        &'a self,
        table_name: &'n str,
    ) -> impl Iterator<Item = &'a CatalogForeignKey> + 'n
    where
        'a: 'n,
    {
        self.foreign_keys.iter().filter(move |fk| fk.table_name == table_name)
    }

    /// Whether `(table, column)` is covered by an index or rowid primary key
    pub fn is_covered(&self, table_name: &str, column_name: &str) -> bool {
        self.index_coverage.iter().any(|r| r.matches(table_name, column_name))
    }
}
