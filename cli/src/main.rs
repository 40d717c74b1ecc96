use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use rowsmith_core::config::{ColumnGenerator, GenerateOptions, PredefinedValue};
use rowsmith_core::diagnostics::{WarningDestination, report_warnings};
use rowsmith_core::model::{GeneratedData, Schema, Value};
use rowsmith_core::{emit, generate};

#[derive(Parser, Debug)]
#[command(name = "rowsmith", about = "Constraint-aware synthetic relational data generator")]
#[command(version)]
struct Cli {
    /// Schema file, JSON or YAML by extension
    #[arg(short, long)]
    schema: PathBuf,

    /// Generation config file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Sql)]
    format: OutputFormat,

    /// Output destination: a file for `sql`, a directory for `csv`/`json`. Defaults to
    /// stdout for `sql`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override `num_rows` from the config file or its default
    #[arg(long)]
    num_rows: Option<usize>,

    /// Override the master RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Fail instead of warn on lossy/unsupported conditions
    #[arg(long)]
    strict: bool,

    /// Warning output destination: file path or "stderr" (default: stderr)
    #[arg(long)]
    emit_warnings: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Sql,
    Csv,
    Json,
}

/// On-disk shape of a generation config file. Closures cannot be expressed here, so
/// `column_type_mappings` entries are restricted to named generators.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    num_rows: Option<usize>,
    num_rows_per_table: Option<HashMap<String, usize>>,
    predefined_values: Option<FilePredefinedValues>,
    column_type_mappings: Option<HashMap<String, HashMap<String, String>>>,
    max_rows_per_insert: Option<usize>,
    run_repair: Option<bool>,
    seed: Option<u64>,
    check_retry_budget: Option<usize>,
    unique_retry_budget: Option<usize>,
    strict: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FilePredefinedValues {
    global: HashMap<String, serde_yaml::Value>,
    tables: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let schema = load_schema(&cli.schema)?;

    let mut options = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read config file: {}", path.display()))?;
            let file_config: FileConfig =
                serde_yaml::from_str(&text).with_context(|| format!("failed to parse config file: {}", path.display()))?;
            apply_file_config(GenerateOptions::default(), file_config)
        }
        None => GenerateOptions::default(),
    };

    if let Some(n) = cli.num_rows {
        options.num_rows = n;
    }
    if let Some(s) = cli.seed {
        options.seed = s;
    }
    if cli.strict {
        options.strict = true;
    }

    let (data, warnings) = generate(&schema, &options).context("generation failed")?;

    let warn_dest = WarningDestination::from_option(cli.emit_warnings.as_deref().map(Path::new));
    report_warnings(&warnings, &warn_dest).context("failed to write warnings")?;

    write_output(cli.format, &schema, &data, &options, cli.output.as_deref())?;

    Ok(())
}

fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read schema file: {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text).with_context(|| format!("failed to parse schema file: {}", path.display())),
        _ => serde_yaml::from_str(&text).with_context(|| format!("failed to parse schema file: {}", path.display())),
    }
}

fn apply_file_config(mut options: GenerateOptions, file: FileConfig) -> GenerateOptions {
    if let Some(n) = file.num_rows {
        options.num_rows = n;
    }
    if let Some(map) = file.num_rows_per_table {
        options.num_rows_per_table = map;
    }
    if let Some(pv) = file.predefined_values {
        for (col, v) in pv.global {
            options.predefined_values.set_global(col, yaml_to_predefined(&v));
        }
        for (table, cols) in pv.tables {
            for (col, v) in cols {
                options.predefined_values.set_table(table.clone(), col, yaml_to_predefined(&v));
            }
        }
    }
    if let Some(mappings) = file.column_type_mappings {
        for (table, cols) in mappings {
            for (col, name) in cols {
                options.column_type_mappings.set(table.clone(), col, ColumnGenerator::Named(name));
            }
        }
    }
    if let Some(v) = file.max_rows_per_insert {
        options.max_rows_per_insert = v;
    }
    if let Some(v) = file.run_repair {
        options.run_repair = v;
    }
    if let Some(v) = file.seed {
        options.seed = v;
    }
    if let Some(v) = file.check_retry_budget {
        options.check_retry_budget = v;
    }
    if let Some(v) = file.unique_retry_budget {
        options.unique_retry_budget = v;
    }
    if let Some(v) = file.strict {
        options.strict = v;
    }
    options
}

fn yaml_to_predefined(value: &serde_yaml::Value) -> PredefinedValue {
    match value {
        serde_yaml::Value::Sequence(items) => PredefinedValue::Choices(items.iter().map(yaml_scalar_to_value).collect()),
        other => PredefinedValue::Scalar(yaml_scalar_to_value(other)),
    }
}

fn yaml_scalar_to_value(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => n.as_i64().map(Value::Int).unwrap_or_else(|| Value::Real(n.as_f64().unwrap_or_default())),
        serde_yaml::Value::String(s) => Value::Text(s.clone()),
        _ => Value::Null,
    }
}

fn write_output(format: OutputFormat, schema: &Schema, data: &GeneratedData, options: &GenerateOptions, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Sql => {
            let sql = emit::sql::render(schema, data, options.max_rows_per_insert);
            match output {
                Some(path) => fs::write(path, &sql).with_context(|| format!("failed to write output file: {}", path.display()))?,
                None => print!("{sql}"),
            }
        }
        OutputFormat::Csv | OutputFormat::Json => {
            let dir = output.context("--output <DIR> is required for csv/json output")?;
            fs::create_dir_all(dir).with_context(|| format!("failed to create output directory: {}", dir.display()))?;
            for (name, table) in &schema.tables {
                let (text, ext) = match format {
                    OutputFormat::Csv => (emit::csv::render_table(table, data), "csv"),
                    OutputFormat::Json => (emit::json::render_table(table, data), "json"),
                    OutputFormat::Sql => unreachable!(),
                };
                let path = dir.join(format!("{name}.{ext}"));
                fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
            }
        }
    }
    Ok(())
}
