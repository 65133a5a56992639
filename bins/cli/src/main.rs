//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Args, Parser, Subcommand};
use commands::{
    FormOperation, run_article_list, run_article_show, run_article_submit, run_config_schema,
    run_config_show,
};
use error::{CliError, ExitCode};
use form_service_config::{LogFormat, LoggingConfig};
use form_service_domain::FormInput;
use form_service_infra::{InfraError, load_effective_config, redact_if_secret};
use form_service_shared::{ErrorCode, ErrorKind};
use format::{OutputArgs, OutputMode};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const ENV_PREFIX: &str = "FORMS_";

#[derive(Debug, Parser)]
#[command(
    name = "forms",
    version,
    about = "Validate and persist article forms",
    long_about = None
)]
struct Cli {
    /// Optional config file path (JSON/TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Article form commands.
    Article {
        #[command(subcommand)]
        command: ArticleCommands,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ArticleCommands {
    /// Validate a submission and create an article.
    Create(FormInputArgs),
    /// Validate a submission and update the article named by its `id` field.
    Update(FormInputArgs),
    /// Show one article.
    Show {
        /// Article id.
        #[arg(long)]
        id: u64,
    },
    /// List all articles.
    List,
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config (file + env overrides).
    Show,
    /// Print the config JSON schema.
    Schema,
}

#[derive(Debug, Args)]
struct FormInputArgs {
    /// Form submission as a JSON object.
    #[arg(long, conflicts_with = "stdin")]
    input: Option<String>,
    /// Read the JSON submission from stdin.
    #[arg(long)]
    stdin: bool,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    let env = collect_scoped_env(ENV_PREFIX);
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => run_config_show(mode, &env, config_path),
            ConfigCommands::Schema => run_config_schema(mode),
        },
        Commands::Article { command } => {
            let config = match load_effective_config(&env, config_path) {
                Ok(config) => config,
                Err(error) => {
                    return Ok(format_error_output(mode, &error, infra_exit_code(&error)));
                },
            };
            init_tracing(&config.logging);

            match command {
                ArticleCommands::Create(args) => match resolve_form_input(args)? {
                    Ok(input) => run_article_submit(mode, &config, FormOperation::Create, &input),
                    Err(error) => Ok(format_error_output(mode, &error, ExitCode::InvalidInput)),
                },
                ArticleCommands::Update(args) => match resolve_form_input(args)? {
                    Ok(input) => run_article_submit(mode, &config, FormOperation::Update, &input),
                    Err(error) => Ok(format_error_output(mode, &error, ExitCode::InvalidInput)),
                },
                ArticleCommands::Show { id } => run_article_show(mode, &config, *id),
                ArticleCommands::List => run_article_list(mode, &config),
            }
        },
    }
}

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise the effective `logging.level`
/// (which already reflects `FORMS_LOG_LEVEL`) is the filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    // A subscriber may already be installed; keeping it is fine.
    let _ = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

/// Decode the submission. The outer error is a CLI usage failure; the
/// inner one is a malformed document reported like any other expected error.
fn resolve_form_input(args: &FormInputArgs) -> Result<Result<FormInput, InfraError>, CliError> {
    let raw = if args.stdin {
        read_stdin_input()?
    } else {
        args.input
            .clone()
            .ok_or_else(|| CliError::InvalidInput("missing --input or --stdin".to_string()))?
    };
    Ok(FormInput::from_json_str(&raw).map_err(InfraError::from))
}

fn read_stdin_input() -> Result<String, CliError> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    let trimmed = buf.trim();
    if trimmed.is_empty() {
        return Err(CliError::InvalidInput("stdin input is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn format_error_output(
    mode: OutputMode,
    error: &InfraError,
    exit_code: ExitCode,
) -> CliOutput {
    let error = sanitize_error(error);

    let mut stderr = String::new();
    log_info(&mut stderr, "command failed", mode.no_progress);

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": error,
        });

        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut output = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\",\"kind\":\"invariant\"}}".to_string()
        });
        output.push('\n');
        output
    } else {
        format_error_text(&error)
    };

    CliOutput {
        stdout,
        stderr,
        exit_code,
    }
}

pub(crate) fn infra_exit_code(error: &InfraError) -> ExitCode {
    match error.kind {
        ErrorKind::Expected => ExitCode::InvalidInput,
        ErrorKind::Invariant => ExitCode::Internal,
        ErrorKind::Unexpected if error.code == ErrorCode::io() => ExitCode::Io,
        ErrorKind::Unexpected => ExitCode::Internal,
    }
}

pub(crate) fn log_info(stderr: &mut String, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}

fn sanitize_error(error: &InfraError) -> InfraError {
    let mut error = error.clone();
    for (key, value) in &mut error.metadata {
        *value = redact_if_secret(key, value);
    }
    error
}

fn format_error_text(error: &InfraError) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }

    out
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect()
}
