//! Config loading helpers (env + file).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{ConfigEnv, FormServiceConfig, ValidatedFormServiceConfig, apply_env_overrides};
use form_service_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

/// Serialized config format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// TOML document.
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension (`.json` when absent).
    pub fn from_path(path: &Path) -> Result<Self, ErrorEnvelope> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "unsupported_format"),
                "unsupported config format; use .json or .toml",
            )
            .with_metadata("extension", other.to_string())),
        }
    }
}

/// Load the config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`ConfigEnv`)
/// - config text (file content)
/// - defaults (`FormServiceConfig::default()`)
pub fn load_config_from_sources(
    config_text: Option<(&str, ConfigFormat)>,
    env: &ConfigEnv,
) -> Result<ValidatedFormServiceConfig, ErrorEnvelope> {
    let config = match config_text {
        None => FormServiceConfig::default(),
        Some((input, format)) => parse_config_unvalidated(input, format)?,
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the config from an optional file path.
pub fn load_config_from_path(
    config_path: Option<&Path>,
    env: &ConfigEnv,
) -> Result<ValidatedFormServiceConfig, ErrorEnvelope> {
    let Some(path) = config_path else {
        return load_config_from_sources(None, env);
    };

    let text = read_config_file(path)?;
    let format = ConfigFormat::from_path(path)?;
    tracing::debug!(path = %path.display(), ?format, "loading config file");
    load_config_from_sources(Some((&text, format)), env)
        .map_err(|error| error.with_metadata("path", path.to_string_lossy().to_string()))
}

/// Load the config from std env and an optional file path.
pub fn load_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedFormServiceConfig, ErrorEnvelope> {
    let env = ConfigEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_config_from_path(config_path, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &FormServiceConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &FormServiceConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<FormServiceConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LogLevelSetting, StorageProvider};

    #[test]
    fn env_wins_over_file() -> Result<(), ErrorEnvelope> {
        let file = r#"{ "logging": { "level": "warn" }, "article": { "maxTags": 4 } }"#;
        let env = ConfigEnv {
            log_level: Some(LogLevelSetting::Debug),
            ..ConfigEnv::default()
        };

        let config = load_config_from_sources(Some((file, ConfigFormat::Json)), &env)?;
        assert_eq!(config.logging.level, LogLevelSetting::Debug);
        assert_eq!(config.article.max_tags, 4);
        assert_eq!(config.article.title_max_chars, 255);
        Ok(())
    }

    #[test]
    fn format_detection() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("forms.TOML")).ok(),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("forms")).ok(),
            Some(ConfigFormat::Json)
        );
        assert!(ConfigFormat::from_path(Path::new("forms.yaml")).is_err());
    }

    #[test]
    fn missing_file_is_expected_error() {
        let result = load_config_from_path(
            Some(Path::new("/definitely/not/here/forms.toml")),
            &ConfigEnv::default(),
        );
        assert!(matches!(
            result,
            Err(error) if error.code.code() == "config_file_not_found" && error.is_expected()
        ));
    }

    #[test]
    fn pretty_toml_round_trips() -> Result<(), ErrorEnvelope> {
        let mut config = FormServiceConfig::default();
        config.storage.provider = StorageProvider::Sqlite;
        config.storage.path = Some("articles.db".to_string());

        let text = to_pretty_toml(&config)?;
        let parsed =
            load_config_from_sources(Some((&text, ConfigFormat::Toml)), &ConfigEnv::default())?;
        assert_eq!(parsed.into_inner(), config);
        Ok(())
    }
}
