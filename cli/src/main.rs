use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use param_schema_config::{SchemaFile, build_registry, load_values};
use param_schema_core::{ParamDefinition, SchemaRegistry, TypeTable, Value, ValueMap};
use tracing::debug;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "param-check")]
#[command(about = "Inspect param schemas and check values against them")]
struct Cli {
    /// Log declaration and assignment steps to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the params a class accepts.
    Describe(DescribeArgs),
    /// Coerce and validate values for a class and print the result.
    Check(CheckArgs),
    /// List the names accepted in a param's `type` field.
    Types,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Schema descriptor file (YAML or JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Class to describe.
    #[arg(long)]
    class: String,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema descriptor file (YAML or JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Class to instantiate.
    #[arg(long)]
    class: String,
    /// Value file with a mapping of param names to values.
    #[arg(long)]
    values: Option<PathBuf>,
    /// Single assignment (NAME=VALUE); overrides the value file. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    assignments: Vec<(String, String)>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Describe(args) => run_describe(args),
        Command::Check(args) => run_check(args),
        Command::Types => run_types(),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let mut registry = load_registry(&args.schema)?;
    let schema = registry
        .schema(&args.class)
        .map_err(|err| err.to_string())?;
    let definitions: Vec<&ParamDefinition> = schema.definitions().collect();

    let rendered = match args.format {
        CliOutputFormat::Table => render_table(&definitions),
        CliOutputFormat::Json => {
            let rows = describe_rows(&definitions);
            serde_json::to_string_pretty(&rows)
                .map_err(|err| format!("Failed to serialize description: {err}"))?
        }
        CliOutputFormat::Yaml => {
            let rows = describe_rows(&definitions);
            serde_yaml::to_string(&rows)
                .map_err(|err| format!("Failed to serialize description: {err}"))?
        }
    };

    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    if args.format == CliOutputFormat::Table {
        return Err("--format table is only supported by 'describe'".to_string());
    }

    let mut registry = load_registry(&args.schema)?;

    let mut params = match &args.values {
        Some(path) => load_values(path).map_err(|err| {
            format!("Failed to load values '{}': {err}", path.display())
        })?,
        None => ValueMap::new(),
    };
    for (name, raw) in args.assignments {
        params.insert(name, Value::from(raw));
    }
    debug!(class = %args.class, params = params.len(), "Checking values");

    let instance = registry
        .instantiate_with(&args.class, params)
        .map_err(|err| err.to_string())?;

    let output = Value::Map(instance.into_params()).to_json();
    let rendered = match args.format {
        CliOutputFormat::Yaml => serde_yaml::to_string(&output)
            .map_err(|err| format!("Failed to serialize params: {err}"))?,
        _ => serde_json::to_string_pretty(&output)
            .map_err(|err| format!("Failed to serialize params: {err}"))?,
    };

    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run_types() -> Result<(), String> {
    for name in TypeTable::standard().names() {
        println!("{name}");
    }
    Ok(())
}

fn load_registry(path: &Path) -> Result<SchemaRegistry, String> {
    let file = SchemaFile::load(path)
        .map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))?;
    build_registry(&file).map_err(|err| err.to_string())
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

fn default_label(definition: &ParamDefinition) -> String {
    match definition.default() {
        Some(default) if default.is_lazy() => "(computed)".to_string(),
        Some(_) if definition.has_default() => definition
            .default_value()
            .map(|value| value.to_string())
            .unwrap_or_default(),
        _ => "-".to_string(),
    }
}

fn describe_rows(definitions: &[&ParamDefinition]) -> serde_json::Value {
    let rows = definitions
        .iter()
        .map(|definition| {
            let default = match definition.default() {
                Some(default) if !default.is_lazy() => default.resolve().to_json(),
                _ => serde_json::Value::Null,
            };
            serde_json::json!({
                "name": definition.name(),
                "type": definition.param_type().to_string(),
                "required": definition.is_required(),
                "default": default,
                "computed_default": definition.default().is_some_and(|d| d.is_lazy()),
                "desc": definition.desc(),
            })
        })
        .collect();
    serde_json::Value::Array(rows)
}

fn render_table(definitions: &[&ParamDefinition]) -> String {
    const HEADERS: [&str; 5] = ["NAME", "TYPE", "REQUIRED", "DEFAULT", "DESCRIPTION"];

    let rows: Vec<[String; 5]> = definitions
        .iter()
        .map(|definition| {
            [
                definition.name().to_string(),
                definition.param_type().to_string(),
                if definition.is_required() { "yes" } else { "no" }.to_string(),
                default_label(definition),
                definition.desc().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: [&str; 5]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_row(HEADERS);
    for row in &rows {
        push_row([&row[0], &row[1], &row[2], &row[3], &row[4]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("count=0x10"),
            Ok(("count".to_string(), "0x10".to_string()))
        );
        assert_eq!(
            parse_assignment("url=https://x.test/?a=b"),
            Ok(("url".to_string(), "https://x.test/?a=b".to_string()))
        );
        assert_eq!(
            parse_assignment("name="),
            Ok(("name".to_string(), String::new()))
        );
        assert!(parse_assignment("count").is_err());
        assert!(parse_assignment("=5").is_err());
    }
}
