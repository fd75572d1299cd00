mod definition;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use argbind_core::{ArgumentBinder, ArgumentSchema, HelpOptions, ValueMap};
use argbind_settings::SettingsFormat;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::definition::SchemaDefinition;

#[derive(Debug, Parser)]
#[command(name = "argbind")]
#[command(about = "Parse, validate and document command lines from a schema definition")]
#[command(version, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bind a command line and print the resulting values.
    Parse(ParseArgs),
    /// Bind a URL query string and print the resulting values.
    Query(QueryArgs),
    /// Print the full help text for a definition.
    Help(HelpArgs),
    /// Print the one-line usage synopsis for a definition.
    Usage(DefinitionArg),
    /// Bind a command line and save the values as a settings document.
    Save(SaveArgs),
    /// Load a settings document and print the resulting values.
    Load(LoadArgs),
}

#[derive(Debug, Args)]
struct DefinitionArg {
    /// Schema definition file (.yaml, .yml or .json).
    definition: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema definition file (.yaml, .yml or .json).
    definition: PathBuf,
    /// Output format for the bound values.
    #[arg(long, default_value = "json")]
    format: SettingsFormat,
    /// Wrap width for help text printed on invalid input.
    #[arg(long, default_value_t = HelpOptions::default().width)]
    width: usize,
    /// Arguments to bind, program name excluded.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Schema definition file (.yaml, .yml or .json).
    definition: PathBuf,
    /// Query string, with or without the leading `?`.
    query: String,
    /// Output format for the bound values.
    #[arg(long, default_value = "json")]
    format: SettingsFormat,
    /// Wrap width for help text printed on invalid input.
    #[arg(long, default_value_t = HelpOptions::default().width)]
    width: usize,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Schema definition file (.yaml, .yml or .json).
    definition: PathBuf,
    /// Column at which help text wraps.
    #[arg(long, default_value_t = HelpOptions::default().width)]
    width: usize,
}

#[derive(Debug, Args)]
struct SaveArgs {
    /// Schema definition file (.yaml, .yml or .json).
    definition: PathBuf,
    /// Settings file to write.
    #[arg(long)]
    output: PathBuf,
    /// Settings encoding (default: from the output extension, else json).
    #[arg(long)]
    format: Option<SettingsFormat>,
    /// Arguments to bind, program name excluded.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct LoadArgs {
    /// Schema definition file (.yaml, .yml or .json).
    definition: PathBuf,
    /// Settings file to read.
    settings: PathBuf,
    /// Settings encoding (default: from the file extension, else json).
    #[arg(long)]
    input_format: Option<SettingsFormat>,
    /// Output format for the loaded values.
    #[arg(long, default_value = "json")]
    format: SettingsFormat,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Query(args) => run_query(args),
        Command::Help(args) => run_help(args),
        Command::Usage(args) => run_usage(args),
        Command::Save(args) => run_save(args),
        Command::Load(args) => run_load(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so bound values on stdout stay machine-readable.
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_binder(path: &Path) -> Result<ArgumentBinder<ValueMap>, String> {
    let definition = SchemaDefinition::load(path)?;
    let (schema, prototype) = definition.build()?;
    debug!(
        definition = %path.display(),
        fields = schema.len(),
        "Loaded schema definition"
    );
    Ok(ArgumentBinder::new(Arc::new(schema), prototype))
}

fn load_schema(path: &Path) -> Result<(ArgumentSchema<ValueMap>, ValueMap), String> {
    SchemaDefinition::load(path)?.build()
}

fn bind_args(binder: &mut ArgumentBinder<ValueMap>, args: &[String], width: usize) -> Result<(), String> {
    let valid = binder.initialize_from_args(args).map_err(|err| err.to_string())?;
    if valid {
        Ok(())
    } else {
        Err(binder.help_text(&HelpOptions { width }))
    }
}

fn format_values(values: &ValueMap, format: SettingsFormat) -> Result<String, String> {
    match format {
        SettingsFormat::Json => serde_json::to_string_pretty(values)
            .map(|json| json + "\n")
            .map_err(|e| format!("JSON serialization failed: {e}")),
        SettingsFormat::Yaml => {
            serde_yaml::to_string(values).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

fn settings_format(path: &Path, explicit: Option<SettingsFormat>) -> SettingsFormat {
    explicit
        .or_else(|| SettingsFormat::from_path(path))
        .unwrap_or_default()
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let mut binder = load_binder(&args.definition)?;
    bind_args(&mut binder, &args.args, args.width)?;
    print!("{}", format_values(binder.config(), args.format)?);
    Ok(())
}

fn run_query(args: QueryArgs) -> Result<(), String> {
    let mut binder = load_binder(&args.definition)?;
    if !binder.initialize_from_query(&args.query) {
        return Err(binder.help_text(&HelpOptions { width: args.width }));
    }
    print!("{}", format_values(binder.config(), args.format)?);
    Ok(())
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let binder = load_binder(&args.definition)?;
    print!("{}", binder.help_text(&HelpOptions { width: args.width }));
    Ok(())
}

fn run_usage(args: DefinitionArg) -> Result<(), String> {
    let binder = load_binder(&args.definition)?;
    println!("{}", binder.usage());
    Ok(())
}

fn run_save(args: SaveArgs) -> Result<(), String> {
    let mut binder = load_binder(&args.definition)?;
    bind_args(&mut binder, &args.args, HelpOptions::default().width)?;

    let format = settings_format(&args.output, args.format);
    argbind_settings::save(binder.schema(), binder.config(), &args.output, format).map_err(|err| {
        format!("Failed to save settings to '{}': {err}", args.output.display())
    })?;
    println!("Saved settings to {}", args.output.display());
    Ok(())
}

fn run_load(args: LoadArgs) -> Result<(), String> {
    let (schema, mut values) = load_schema(&args.definition)?;
    let format = settings_format(&args.settings, args.input_format);
    argbind_settings::load(&schema, &args.settings, format, &mut values).map_err(|err| {
        format!("Failed to load settings from '{}': {err}", args.settings.display())
    })?;
    print!("{}", format_values(&values, args.format)?);
    Ok(())
}
