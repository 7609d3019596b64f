use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqlite_lint_catalog::{Normalizer, SchemaLoader};
use sqlite_lint_core::{Catalog, Config, Report, RuleActivation};
use sqlite_lint_engine::{lint_file, RuleRegistry};

/// Default config file looked up in the working directory
const DEFAULT_CONFIG: &str = "sqlite-lint.toml";

/// sqlite-lint - Structural best-practice checks for SQLite schemas
#[derive(Parser)]
#[command(name = "sqlite-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlite-lint.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a schema file
    Check {
        /// Schema definition file
        schema: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable a rule for this run (repeatable)
        #[arg(long = "disable", value_name = "RULE")]
        disable: Vec<String>,
    },

    /// List the available rules
    Rules,

    /// Print the normalized catalog of a schema file
    Catalog {
        /// Schema definition file
        schema: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = CatalogFormat::Text)]
        format: CatalogFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CatalogFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // INPUT_* variables may come from a local .env when running outside CI
    dotenvy::dotenv().ok();

    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { schema, format, output, disable } => {
            check_command(&config, &schema, format, output.as_deref(), &disable)
        }
        Commands::Rules => rules_command(&config),
        Commands::Catalog { schema, format } => catalog_command(&schema, format),
    }
}

/// Log to stderr, filtered by RUST_LOG unless --verbose is set
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = if let Some(config_path) = path {
        Config::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        tracing::debug!("no config file found, using defaults");
        Config::default()
    };

    Ok(config)
}

/// Combine config file, `INPUT_*` variables and --disable flags
///
/// Later sources win: flags over environment over file.
fn resolve_activation<F>(
    config: &Config,
    registry: &RuleRegistry,
    disable: &[String],
    lookup: F,
) -> Result<RuleActivation>
where
    F: Fn(&str) -> Option<String>,
{
    for rule in config.rules.keys() {
        if registry.get(rule).is_none() {
            tracing::warn!(rule = %rule, "config mentions unknown rule");
        }
    }

    let mut activation = config.activation();
    activation.apply_env(registry.names(), lookup);

    for rule in disable {
        if registry.get(rule).is_none() {
            return Err(anyhow::anyhow!(
                "Unknown rule '{}'. Available rules: {}",
                rule,
                registry.names().join(", ")
            ));
        }
        activation.set(rule.clone(), false);
    }

    Ok(activation)
}

/// Check command - lint one schema file
fn check_command(
    config: &Config,
    schema: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    disable: &[String],
) -> Result<()> {
    let registry = RuleRegistry::builtin();
    let activation = resolve_activation(config, registry, disable, |name| std::env::var(name).ok())?;

    let result = lint_file(schema, registry, &activation)?;
    let report = Report::from_run(result).with_schema(schema.display().to_string());

    if let Some(path) = output {
        report.save_to_file(path)?;
        tracing::info!(path = %path.display(), "report saved");
    }

    match format {
        OutputFormat::Text => print!("{}", render_text(&report, schema)),
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Markdown => print!("{}", generate_markdown_report(&report)),
    }

    // Exit with error code if any rule failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

/// Rules command - list the registry and the resolved activation
fn rules_command(config: &Config) -> Result<()> {
    let registry = RuleRegistry::builtin();
    let activation = resolve_activation(config, registry, &[], |name| std::env::var(name).ok())?;

    for rule in registry.iter() {
        let state = if activation.is_active(rule.name) {
            "active".green()
        } else {
            "disabled".yellow()
        };

        println!("{} [{}]", rule.name.bold(), state);
        for line in rule.explanation.lines() {
            println!("    {}", line);
        }
        println!();
    }

    Ok(())
}

/// Catalog command - dump the normalized relations
fn catalog_command(schema: &Path, format: CatalogFormat) -> Result<()> {
    let normalized = Normalizer::normalize(SchemaLoader::load_file(schema)?)?;

    match format {
        CatalogFormat::Text => print!("{}", render_catalog(normalized.catalog())),
        CatalogFormat::Json => println!("{}", serde_json::to_string_pretty(normalized.catalog())?),
    }

    Ok(())
}

/// Human-readable catalog, one block per table
fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();

    for table in &catalog.tables {
        let mut flags = Vec::new();
        if table.strict_typing {
            flags.push("strict");
        }
        if !table.uses_rowid {
            flags.push("without rowid");
        }

        out.push_str(&table.name.bold().to_string());
        if !flags.is_empty() {
            out.push_str(&format!(" ({})", flags.join(", ")));
        }
        out.push('\n');

        let key: Vec<_> = catalog
            .primary_key(&table.name)
            .iter()
            .map(|c| c.column_name.as_str())
            .collect();
        if key.is_empty() {
            out.push_str(&format!("  primary key: {}\n", "none".yellow()));
        } else {
            out.push_str(&format!("  primary key: {}\n", key.join(", ")));
        }

        for column in catalog.columns_of(&table.name) {
            let mut line = format!("  {}", column.column_name);
            if !column.declared_type.is_empty() {
                line.push_str(&format!(" {}", column.declared_type));
            }
            line.push_str(if column.nullable { " null" } else { " not null" });
            if column.has_default {
                line.push_str(" default");
            }
            if catalog.is_covered(&table.name, &column.column_name) {
                line.push_str(" indexed");
            }
            out.push_str(&line);
            out.push('\n');
        }

        for fk in catalog.foreign_keys_of(&table.name) {
            let target = if catalog.is_covered(&fk.target.table, &fk.target.column) {
                "indexed".normal()
            } else {
                "not indexed".yellow()
            };
            out.push_str(&format!(
                "  {} -> {}.{} ({})\n",
                fk.column_name, fk.target.table, fk.target.column, target
            ));
        }

        out.push('\n');
    }

    out
}

/// Human-readable report
fn render_text(report: &Report, schema: &Path) -> String {
    let mut out = String::new();

    out.push_str(&format!("-----------------\nLinting {}\n", schema.display()));

    for outcome in report.rules.iter().filter(|o| !o.passed()) {
        out.push_str(&format!("{}\n", format!("Check '{}' failed:", outcome.rule).red()));
        for violation in &outcome.violations {
            out.push_str(&format!("{}\n", format!("- {}", violation).red()));
        }
        out.push_str(&format!("{}\n\n", format!("Explanation: {}", outcome.explanation).red()));
    }

    if report.has_failures() {
        out.push_str(&format!("{}\n", "Errors found".red()));
    } else {
        out.push_str(&format!("{}\n", "Success".green()));
    }

    out
}

/// Generate markdown report
fn generate_markdown_report(report: &Report) -> String {
    let mut md = String::new();

    md.push_str("# SQLite Schema Lint Report\n\n");
    if let Some(schema) = &report.schema {
        md.push_str(&format!("**Schema:** `{}`\n\n", schema));
    }
    md.push_str(&format!("**Version:** {}\n\n", report.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Rules checked: {}\n", report.summary.rules_checked));
    md.push_str(&format!("- Rules failed: {}\n", report.summary.rules_failed));
    md.push_str(&format!("- Violations: {}\n", report.summary.violations));
    md.push('\n');

    if !report.has_failures() {
        md.push_str("✅ **No issues found!**\n");
        return md;
    }

    md.push_str("## Failed Rules\n\n");
    for outcome in report.rules.iter().filter(|o| !o.passed()) {
        md.push_str(&format!("### ❌ {}\n\n", outcome.rule));
        md.push_str(&format!("{}\n\n", outcome.explanation.replace('\n', " ")));

        md.push_str("| Table | Column | Message |\n");
        md.push_str("|---|---|---|\n");
        for violation in &outcome.violations {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                violation.table_name, violation.column_name, violation.error_msg
            ));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlite_lint_core::{RuleOutcome, RunResult, Violation};
    use std::collections::HashMap;

    fn failing_report() -> Report {
        let mut result = RunResult::new();
        result.push(RuleOutcome::new(
            "require_not_null",
            "All columns should be marked as `not null`.",
            vec![Violation::new("Column should be \"not null\"", "users", "nickname")],
        ));
        result.push(RuleOutcome::new("require_strict", "Tables should be strict.", vec![]));
        Report::from_run(result).with_schema("schema.sql")
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_arguments() {
        let cli = Cli::try_parse_from([
            "sqlite-lint", "check", "schema.sql", "--format", "json", "--disable", "require_strict",
        ])
        .unwrap();

        match cli.command {
            Commands::Check { schema, format, output, disable } => {
                assert_eq!(schema, PathBuf::from("schema.sql"));
                assert_eq!(format, OutputFormat::Json);
                assert!(output.is_none());
                assert_eq!(disable, vec!["require_strict".to_string()]);
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn activation_precedence() {
        let mut config = Config::default();
        config.rules.insert("require_strict".to_string(), false);
        config.rules.insert("forbid_int_type".to_string(), false);

        let env: HashMap<&str, &str> = [("INPUT_FORBID_INT_TYPE", "true")].into_iter().collect();
        let activation = resolve_activation(
            &config,
            RuleRegistry::builtin(),
            &["require_not_null".to_string()],
            |name| env.get(name).map(|v| v.to_string()),
        )
        .unwrap();

        assert!(!activation.is_active("require_strict"));
        assert!(activation.is_active("forbid_int_type"));
        assert!(!activation.is_active("require_not_null"));
        assert!(activation.is_active("require_explicit_primary_key"));
    }

    #[test]
    fn unknown_disabled_rule_is_rejected() {
        let err = resolve_activation(
            &Config::default(),
            RuleRegistry::builtin(),
            &["no_such_rule".to_string()],
            |_| None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no_such_rule"));
    }

    #[test]
    fn catalog_format_defaults_to_text() {
        let cli = Cli::try_parse_from(["sqlite-lint", "catalog", "schema.sql"]).unwrap();
        assert!(matches!(cli.command, Commands::Catalog { format: CatalogFormat::Text, .. }));
    }

    #[test]
    fn catalog_text_rendering() {
        colored::control::set_override(false);
        let normalized = sqlite_lint_catalog::load_catalog(
            "create table users (rowid integer primary key, handle text not null) strict;
             create table posts (
                 rowid integer primary key,
                 author text not null references users(handle),
                 editor integer references users(rowid)
             ) strict;
             create table log (message text);",
        )
        .unwrap();

        let text = render_catalog(normalized.catalog());

        assert!(text.contains("users (strict)\n  primary key: rowid\n"));
        assert!(text.contains("  rowid INTEGER null indexed\n"));
        assert!(text.contains("  author -> users.handle (not indexed)\n"));
        assert!(text.contains("  editor -> users.rowid (indexed)\n"));
        assert!(text.contains("log\n  primary key: none\n  message text null\n"));
    }

    #[test]
    fn text_report_lists_failures() {
        colored::control::set_override(false);
        let text = render_text(&failing_report(), Path::new("schema.sql"));

        assert!(text.contains("Linting schema.sql"));
        assert!(text.contains("Check 'require_not_null' failed:"));
        assert!(text.contains("- Column should be \"not null\": users.nickname"));
        assert!(text.contains("Explanation: All columns should be marked as `not null`."));
        assert!(!text.contains("require_strict"));
        assert!(text.ends_with("Errors found\n"));
    }

    #[test]
    fn text_report_success() {
        colored::control::set_override(false);
        let report = Report::from_run(RunResult::new());
        let text = render_text(&report, Path::new("ok.sql"));
        assert!(text.ends_with("Success\n"));
    }

    #[test]
    fn markdown_report() {
        let md = generate_markdown_report(&failing_report());
        assert!(md.contains("**Schema:** `schema.sql`"));
        assert!(md.contains("- Rules failed: 1"));
        assert!(md.contains("### ❌ require_not_null"));
        assert!(md.contains("| users | nickname | Column should be \"not null\" |"));
    }
}
