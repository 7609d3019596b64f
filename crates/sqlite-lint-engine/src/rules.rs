//! Rule registry
//!
//! Rules are data: a name, an explanation and a read-only query over the
//! canonical relations (`lint_tables`, `lint_columns`, `lint_foreign_keys`,
//! `lint_index_coverage`).
//! Each query returns `error_msg`, `table_name` and `column_name` columns,
//! one row per violation. Adding a rule means adding an entry here.
//!
//! Rule names are STABLE: they key configuration and `INPUT_*` variables.

use std::sync::OnceLock;

use crate::error::RegistryError;

pub const REQUIRE_NOT_NULL: &str = "require_not_null";
pub const REQUIRE_STRICT: &str = "require_strict";
pub const FORBID_INT_TYPE: &str = "forbid_int_type";
pub const REQUIRE_EXPLICIT_PRIMARY_KEY: &str = "require_explicit_primary_key";
pub const REQUIRE_INDEXES_FOR_FOREIGN_KEYS: &str = "require_indexes_for_foreign_keys";

/// A named lint rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Unique, stable name
    pub name: &'static str,

    /// Why the rule exists, shown when it fails
    pub explanation: &'static str,

    /// Query yielding one row per violation
    pub query: &'static str,
}

const BUILTIN_RULES: &[Rule] = &[
    Rule {
        name: REQUIRE_NOT_NULL,
        // primary keys are implicitly not-null but pragma_table_info doesn't say so
        query: r#"
            select 'Column should be "not null"' as error_msg,
                   table_name,
                   column_name
              from lint_columns
             where nullable
               and fk_target_column is null
               and primary_key_ordinal = 0
             order by table_name, position
        "#,
        explanation: "All columns should be marked as `not null` unless they are foreign keys.  (Primary keys are\n\
                      automatically not-null, and don't need to be specified.)",
    },
    Rule {
        name: REQUIRE_STRICT,
        query: r#"
            select 'Table should be marked "strict"' as error_msg,
                   name as table_name,
                   '' as column_name
              from lint_tables
             where not strict_typing
             order by name
        "#,
        explanation: "All tables should be marked as `strict` (must specify column types; types must be int,\n\
                      integer, real, text, blob or any).  This disallows all 'date' and 'time' column types.\n\
                      See more: https://www.sqlite.org/stricttables.html",
    },
    Rule {
        name: FORBID_INT_TYPE,
        query: r#"
            select 'Column should use "integer" type instead of "int"' as error_msg,
                   table_name,
                   column_name
              from lint_columns
             where declared_type = 'int' collate nocase
             order by table_name, position
        "#,
        explanation: "All columns should use `integer` type instead of `int`.",
    },
    Rule {
        name: REQUIRE_EXPLICIT_PRIMARY_KEY,
        query: r#"
            select 'Table should declare an explicit primary key' as error_msg,
                   t.name as table_name,
                   '' as column_name
              from lint_tables as t
             where not exists (select 1
                                 from lint_columns as c
                                where c.table_name = t.name
                                  and c.primary_key_ordinal > 0)
             order by t.name
        "#,
        explanation: "All tables must have a primary key.  If it's rowid, it has to be named explicitly.",
    },
    Rule {
        name: REQUIRE_INDEXES_FOR_FOREIGN_KEYS,
        query: r#"
            select 'Foreign keys should point to indexed columns' as error_msg,
                   fk.table_name,
                   fk.column_name
              from lint_foreign_keys as fk
             where not exists (select 1
                                 from lint_index_coverage as ix
                                where ix.table_name = fk.fk_target_table collate nocase
                                  and ix.column_name = fk.fk_target_column collate nocase)
             order by fk.table_name, fk.position, fk.constraint_id desc
        "#,
        explanation: "Columns referenced by foreign keys must have indexes.",
    },
];

/// Immutable, ordered collection of rules
///
/// Disabling a rule is a filter applied at evaluation time; the registry
/// itself never changes once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// The built-in rule set, constructed once per process
    pub fn builtin() -> &'static RuleRegistry {
        static BUILTIN: OnceLock<RuleRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| RuleRegistry {
            rules: BUILTIN_RULES.to_vec(),
        })
    }

    /// Build a registry from custom rules, rejecting duplicate names
    pub fn new(rules: Vec<Rule>) -> Result<Self, RegistryError> {
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|r| r.name == rule.name) {
                return Err(RegistryError::DuplicateRule(rule.name.to_string()));
            }
        }
        Ok(Self { rules })
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Rules in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
