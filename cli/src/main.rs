use std::io::Stderr;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use switchbind_core::{
    Binder, ConverterRegistry, EXIT_FATAL, EXIT_HELP_REQUESTED, ParserSettings, ValueMap,
    tokenize,
};
use switchbind_prompt::{CrosstermKeys, TerminalPrompter};
use tracing::{Level, debug};

mod schema_file;
mod usage;

use schema_file::SchemaFile;
use usage::render_usage;

#[derive(Debug, Parser)]
#[command(name = "switchbind")]
#[command(about = "Tokenize switch arguments and bind them against a schema", version)]
struct Cli {
    /// Log binder decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Split arguments into switch groups and print them as JSON.
    Tokenize(TokenizeArgs),
    /// Bind arguments against a schema file and print the values as JSON.
    Bind(BindArgs),
    /// Print usage text for a schema file.
    Usage(UsageArgs),
    /// Validate a settings file and print the effective settings as YAML.
    Settings(SettingsArgs),
}

#[derive(Debug, Args)]
struct TokenizeArgs {
    /// Parser settings YAML file.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Arguments to tokenize (pass after `--`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct BindArgs {
    /// Schema file (YAML, or JSON by extension).
    #[arg(long)]
    schema: PathBuf,
    /// Parser settings YAML file.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Prompt on the terminal for missing required fields.
    #[arg(long)]
    interactive: bool,
    /// Arguments to bind (pass after `--`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Schema file (YAML, or JSON by extension).
    #[arg(long)]
    schema: PathBuf,
    /// Parser settings YAML file.
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SettingsArgs {
    /// Settings file to validate; defaults are used when omitted.
    file: Option<PathBuf>,
    /// Write the effective settings to this path instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

/// A failed command: the message for stderr and the process exit status.
struct Failure {
    message: String,
    code: i32,
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self {
            message,
            code: EXIT_FATAL,
        }
    }
}

#[derive(Serialize)]
struct BindOutput<'a> {
    values: &'a ValueMap,
    errors: Vec<String>,
    ignored: Vec<String>,
    help_requested: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Tokenize(args) => run_tokenize(args),
        Command::Bind(args) => run_bind(args),
        Command::Usage(args) => run_usage(args),
        Command::Settings(args) => run_settings(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            std::process::exit(failure.code);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<ParserSettings, String> {
    match path {
        Some(path) => ParserSettings::load(path)
            .map_err(|err| format!("Failed to load settings '{}': {err}", path.display())),
        None => Ok(ParserSettings::default()),
    }
}

fn load_schema(
    path: &Path,
    registry: &ConverterRegistry,
    settings: &ParserSettings,
) -> Result<switchbind_core::Schema, String> {
    SchemaFile::load(path)?.into_schema(registry, settings)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("Failed to serialize output: {err}"))
}

// ---------------------------------------------------------------------------
// tokenize
// ---------------------------------------------------------------------------

fn run_tokenize(args: TokenizeArgs) -> Result<i32, Failure> {
    let settings = load_settings(args.settings.as_deref())?;
    let tokenized = tokenize(&args.args, &settings).map_err(|err| Failure {
        message: err.to_string(),
        code: err.exit_code(),
    })?;
    println!("{}", to_json(&tokenized)?);
    Ok(0)
}

// ---------------------------------------------------------------------------
// bind
// ---------------------------------------------------------------------------

fn run_bind(args: BindArgs) -> Result<i32, Failure> {
    let mut settings = load_settings(args.settings.as_deref())?;
    if args.interactive {
        settings = settings.prompt_for_missing_required(true);
    }

    let registry = ConverterRegistry::new();
    let schema = load_schema(&args.schema, &registry, &settings)?;
    let usage = render_usage(&schema, &settings);
    let show_help_on_errors = settings.show_help_on_errors;

    let mut binder = Binder::new(settings).with_registry(registry);
    if args.interactive {
        binder = binder.with_prompter(interactive_prompter());
    }

    let result = match binder.parse(&args.args, &schema) {
        Ok(result) => result,
        Err(err) => {
            debug!(class = ?err.class(), "bind failed");
            if show_help_on_errors {
                eprint!("{usage}");
            }
            return Err(Failure {
                message: err.to_string(),
                code: err.exit_code(),
            });
        }
    };

    if result.needs_usage() {
        print!("{usage}");
        return Ok(EXIT_HELP_REQUESTED);
    }

    let output = BindOutput {
        values: &result.values,
        errors: result.errors.iter().map(ToString::to_string).collect(),
        ignored: result.ignored.iter().map(ToString::to_string).collect(),
        help_requested: result.help_requested,
    };
    println!("{}", to_json(&output)?);
    Ok(0)
}

/// Prompts draw on stderr so stdout carries only the JSON result.
fn interactive_prompter() -> TerminalPrompter<CrosstermKeys, Stderr> {
    TerminalPrompter::stderr()
}

// ---------------------------------------------------------------------------
// usage
// ---------------------------------------------------------------------------

fn run_usage(args: UsageArgs) -> Result<i32, Failure> {
    let settings = load_settings(args.settings.as_deref())?;
    let schema = load_schema(&args.schema, &ConverterRegistry::new(), &settings)?;
    print!("{}", render_usage(&schema, &settings));
    Ok(0)
}

// ---------------------------------------------------------------------------
// settings
// ---------------------------------------------------------------------------

fn run_settings(args: SettingsArgs) -> Result<i32, Failure> {
    let settings = load_settings(args.file.as_deref())?;
    match args.output {
        Some(path) => {
            settings
                .save(&path)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            println!("Wrote settings to {}", path.display());
        }
        None => {
            let yaml = serde_yaml::to_string(&settings)
                .map_err(|err| format!("Failed to serialize settings: {err}"))?;
            print!("{yaml}");
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interactive_prompts_leave_stdout_for_results() {
        let (_, out): (CrosstermKeys, Stderr) = interactive_prompter().into_parts();
        drop(out);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
