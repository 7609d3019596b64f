//! Integration tests over the schema fixtures in `fixtures/schemas`

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use sqlite_lint_core::{RuleActivation, RunResult, Violation};
use sqlite_lint_engine::rules::{
    FORBID_INT_TYPE, REQUIRE_EXPLICIT_PRIMARY_KEY, REQUIRE_INDEXES_FOR_FOREIGN_KEYS,
    REQUIRE_NOT_NULL, REQUIRE_STRICT,
};
use sqlite_lint_engine::{lint_file, lint_schema, LintError, RuleRegistry};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/schemas")
        .join(name)
}

fn lint_fixture(name: &str) -> RunResult {
    lint_file(&fixture(name), RuleRegistry::builtin(), &RuleActivation::all_active())
        .unwrap_or_else(|e| panic!("failed to lint {}: {}", name, e))
}

fn lint(schema: &str) -> RunResult {
    lint_schema(schema, RuleRegistry::builtin(), &RuleActivation::all_active()).unwrap()
}

fn failed_rules(result: &RunResult) -> Vec<&str> {
    result.failed().map(|o| o.rule.as_str()).collect()
}

#[test]
fn failure_fixtures_fail_only_their_rule() {
    let cases = [
        ("failure-has-foreign-key-no-index.sql", vec![REQUIRE_INDEXES_FOR_FOREIGN_KEYS]),
        ("failure-has-ints.sql", vec![FORBID_INT_TYPE]),
        ("failure-has-nulls.sql", vec![REQUIRE_NOT_NULL]),
        ("failure-no-strict.sql", vec![REQUIRE_STRICT]),
        ("failure-no-primary-key.sql", vec![REQUIRE_EXPLICIT_PRIMARY_KEY]),
    ];

    for (file, expected) in cases {
        let result = lint_fixture(file);
        assert_eq!(failed_rules(&result), expected, "unexpected failures for {}", file);
    }
}

#[test]
fn total_failure_fixture_fails_every_rule() {
    let result = lint_fixture("failure-total.sql");
    assert_eq!(failed_rules(&result), RuleRegistry::builtin().names());
}

#[test]
fn success_fixture_passes_every_rule() {
    let result = lint_fixture("success.sql");
    assert_eq!(result.rule_names(), RuleRegistry::builtin().names());
    assert!(result.is_success(), "unexpected violations: {:?}", result);
    assert_eq!(result.violation_count(), 0);
}

#[test]
fn total_failure_details() {
    let result = lint_fixture("failure-total.sql");

    assert_eq!(
        result.violations(REQUIRE_EXPLICIT_PRIMARY_KEY).unwrap(),
        &[
            Violation::for_table("Table should declare an explicit primary key", "people"),
            Violation::for_table("Table should declare an explicit primary key", "pets"),
        ]
    );
    assert_eq!(
        result.violations(REQUIRE_INDEXES_FOR_FOREIGN_KEYS).unwrap(),
        &[Violation::new("Foreign keys should point to indexed columns", "pets", "owner")]
    );
    assert_eq!(
        result.violations(FORBID_INT_TYPE).unwrap(),
        &[Violation::new("Column should use \"integer\" type instead of \"int\"", "people", "age")]
    );
}

#[test]
fn linting_is_deterministic() {
    let first = lint_fixture("failure-total.sql");
    let second = lint_fixture("failure-total.sql");
    assert_eq!(first, second);
}

#[test]
fn runs_in_one_process_do_not_interfere() {
    let failing = lint("create table users (nickname text);");
    let passing = lint("create table users (rowid integer primary key, nickname text not null) strict;");

    assert!(!failing.is_success());
    assert!(passing.is_success());
}

#[test]
fn nullability_property() {
    let nullable = lint("create table t (rowid integer primary key, c text) strict;");
    assert_eq!(nullable.violations(REQUIRE_NOT_NULL).unwrap().len(), 1);

    let not_null = lint("create table t (rowid integer primary key, c text not null) strict;");
    assert!(not_null.violations(REQUIRE_NOT_NULL).unwrap().is_empty());

    let key = lint("create table t (c text primary key) strict;");
    assert!(key.violations(REQUIRE_NOT_NULL).unwrap().is_empty());

    let foreign = lint(
        "create table p (rowid integer primary key) strict;
         create table t (rowid integer primary key, c integer references p(rowid)) strict;",
    );
    assert!(foreign.violations(REQUIRE_NOT_NULL).unwrap().is_empty());
}

#[test]
fn primary_key_property() {
    let keyless = lint("create table t (c text not null) strict;");
    let found = keyless.violations(REQUIRE_EXPLICIT_PRIMARY_KEY).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].column_name, "");

    let keyed = lint("create table t (c text not null primary key) strict;");
    assert!(keyed.violations(REQUIRE_EXPLICIT_PRIMARY_KEY).unwrap().is_empty());
}

#[test]
fn typing_property() {
    let bare = lint("create table t (rowid integer primary key, c int not null) strict;");
    assert_eq!(bare.violations(FORBID_INT_TYPE).unwrap().len(), 1);

    let full = lint("create table t (rowid integer primary key, c integer not null) strict;");
    assert!(full.violations(FORBID_INT_TYPE).unwrap().is_empty());
}

#[test]
fn foreign_key_indexing_property() {
    let schema = "create table p (rowid integer primary key, code text not null) strict;
                  create table t (rowid integer primary key, c text references p(code)) strict;";

    let unindexed = lint(schema);
    assert_eq!(unindexed.violations(REQUIRE_INDEXES_FOR_FOREIGN_KEYS).unwrap().len(), 1);

    let indexed = lint(&format!("{schema}\ncreate index p_code on p (code);"));
    assert!(indexed.violations(REQUIRE_INDEXES_FOR_FOREIGN_KEYS).unwrap().is_empty());
}

#[test]
fn disabled_rules_do_not_run() {
    let activation = RuleActivation::all_active().with(REQUIRE_STRICT, false);
    let result = lint_file(&fixture("failure-no-strict.sql"), RuleRegistry::builtin(), &activation).unwrap();

    assert!(result.is_success());
    assert!(result.get(REQUIRE_STRICT).is_none());
    assert_eq!(result.outcomes.len(), RuleRegistry::builtin().len() - 1);
}

#[test]
fn missing_fixture_is_load_error() {
    let err = lint_file(&fixture("does-not-exist.sql"), RuleRegistry::builtin(), &RuleActivation::all_active())
        .unwrap_err();
    assert!(matches!(err, LintError::Load(_)));
}
