use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use boolean_parser::config::{Flavor, SchemaConfig};
use boolean_parser::sql;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Expression to parse, e.g. "x > 5 and not name = foo*"
    pub expression: String,

    /// Grammar to parse with
    #[arg(long, value_enum, default_value_t = Flavor::Standard)]
    pub flavor: Flavor,

    /// Schema file (YAML) listing the models to lower against
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Output format (repr without a schema, sql with one)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Also print the parameter names referenced by the expression
    #[arg(long)]
    pub params: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    /// Canonical form: `and_(x>5, y<3)`
    Repr,
    /// Serialized AST
    Json,
    /// SQL with literals inline
    Sql,
    /// SQL with `?` placeholders, then one bound value per line
    Bound,
}

/// Parse the expression and render it in the requested format.
pub fn run(cli: &Cli) -> Result<String> {
    let expr = cli
        .flavor
        .parser()
        .parse(&cli.expression)
        .context("CLI: Failed to parse expression")?;

    let format = cli.format.unwrap_or(if cli.schema.is_some() {
        OutputFormat::Sql
    } else {
        OutputFormat::Repr
    });

    let mut out = match format {
        OutputFormat::Repr => expr.to_string(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&expr).context("CLI: Failed to serialize expression")?
        }
        OutputFormat::Sql | OutputFormat::Bound => {
            let path = cli
                .schema
                .as_deref()
                .context("CLI: SQL output needs a schema; use --schema")?;
            let models = SchemaConfig::load(path)?.descriptors()?;
            tracing::info!("Schema: {} models from {}", models.len(), path.display());

            let predicate =
                sql::filter(&expr, &models).context("CLI: Failed to lower expression")?;
            if format == OutputFormat::Sql {
                predicate.to_string()
            } else {
                let bound = predicate.to_sql();
                let mut lines = vec![bound.sql];
                lines.extend(bound.params.iter().map(ToString::to_string));
                lines.join("\n")
            }
        }
    };

    if cli.params {
        for param in expr.params() {
            out.push('\n');
            out.push_str(&param);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("boolean-parser").chain(args.iter().copied()))
    }

    #[test]
    fn test_repr_is_default_without_schema() {
        let out = run(&cli(&["x > 5 or y < 3 and not z == 2"])).unwrap();
        assert_eq!(out, "or_(x>5, and_(y<3, not_(z==2)))");
    }

    #[test]
    fn test_params_listing() {
        let out = run(&cli(&["--params", "b < 3 and a > 5"])).unwrap();
        assert_eq!(out, "and_(b<3, a>5)\na\nb");
    }

    #[test]
    fn test_json_output() {
        let out = run(&cli(&["--format", "json", "a between 3 and 5"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["condition"]["operator"], "between");
        assert_eq!(value["condition"]["value2"], "5");
    }

    #[test]
    fn test_sql_flavor_rejects_words() {
        let err = run(&cli(&["--flavor", "sql", "stuff"])).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse expression"));
    }

    #[test]
    fn test_sql_needs_schema() {
        assert!(run(&cli(&["--format", "sql", "x > 5"])).is_err());
    }
}
