//! Config command handlers.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{format_error_output, infra_exit_code, log_info};
use form_service_config::config_schema_json;
use form_service_infra::load_effective_config_json;
use std::collections::BTreeMap;
use std::path::Path;

/// Run `config show`: the effective config after file and env overrides.
pub fn run_config_show(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    path: Option<&Path>,
) -> Result<CliOutput, CliError> {
    let config_json = match load_effective_config_json(env, path) {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config show completed", mode.no_progress);

    let stdout = if mode.is_json() {
        let config_value: serde_json::Value = serde_json::from_str(config_json.trim())?;
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path.map(|value| value.to_string_lossy().to_string()),
            "effectiveConfig": config_value,
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        let mut out = String::new();
        out.push_str("status: ok\nconfig:\n");
        out.push_str(&config_json);
        out
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

/// Run `config schema`. The schema is JSON in both output modes.
pub fn run_config_schema(mode: OutputMode) -> Result<CliOutput, CliError> {
    match config_schema_json() {
        Ok(stdout) => Ok(CliOutput {
            stdout,
            stderr: String::new(),
            exit_code: ExitCode::Ok,
        }),
        Err(error) => Ok(format_error_output(mode, &error, ExitCode::Internal)),
    }
}
