//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but empty or malformed
//! fails fast instead of silently falling back to the file value.

use crate::schema::{
    FormServiceConfig, LogFormat, LogLevelSetting, StorageProvider, ValidatedFormServiceConfig,
};
use form_service_shared::{ErrorCode, ErrorEnvelope, redact_if_secret};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Env var: storage provider (`memory` or `sqlite`).
pub const ENV_STORAGE_PROVIDER: &str = "FORMS_STORAGE_PROVIDER";
/// Env var: storage path (SQLite file).
pub const ENV_STORAGE_PATH: &str = "FORMS_STORAGE_PATH";
/// Env var: minimum log level.
pub const ENV_LOG_LEVEL: &str = "FORMS_LOG_LEVEL";
/// Env var: log format (`text` or `json`).
pub const ENV_LOG_FORMAT: &str = "FORMS_LOG_FORMAT";
/// Env var: article title max chars.
pub const ENV_ARTICLE_TITLE_MAX_CHARS: &str = "FORMS_ARTICLE_TITLE_MAX_CHARS";
/// Env var: article max tags.
pub const ENV_ARTICLE_MAX_TAGS: &str = "FORMS_ARTICLE_MAX_TAGS";

const ALL_VARS: [&str; 6] = [
    ENV_STORAGE_PROVIDER,
    ENV_STORAGE_PATH,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
    ENV_ARTICLE_TITLE_MAX_CHARS,
    ENV_ARTICLE_MAX_TAGS,
];

/// Parsed env overrides. `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    /// Storage provider override.
    pub storage_provider: Option<StorageProvider>,
    /// Storage path override.
    pub storage_path: Option<String>,
    /// Log level override.
    pub log_level: Option<LogLevelSetting>,
    /// Log format override.
    pub log_format: Option<LogFormat>,
    /// Title max chars override.
    pub article_title_max_chars: Option<u32>,
    /// Max tags override.
    pub article_max_tags: Option<u32>,
}

/// Env parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    #[error("{var} is set but empty")]
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    #[error("{var} must be a non-negative integer")]
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    #[error("{var} must be one of: {allowed}")]
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
        /// Accepted spellings.
        allowed: &'static str,
    },
}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let message = error.to_string();
        match error {
            EnvParseError::EmptyValue { var } => {
                Self::expected(ErrorCode::new("config", "env_empty"), message)
                    .with_metadata("var", var)
            },
            EnvParseError::InvalidInt { var, value } => {
                Self::expected(ErrorCode::new("config", "env_invalid_int"), message)
                    .with_metadata("var", var)
                    .with_metadata("value", redact_if_secret(var, &value))
            },
            EnvParseError::InvalidEnum { var, value, .. } => {
                Self::expected(ErrorCode::new("config", "env_invalid_enum"), message)
                    .with_metadata("var", var)
                    .with_metadata("value", redact_if_secret(var, &value))
            },
        }
    }
}

impl ConfigEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            storage_provider: parse_optional_enum(map, ENV_STORAGE_PROVIDER, "memory, sqlite")?,
            storage_path: parse_optional_trimmed_string(map, ENV_STORAGE_PATH)?,
            log_level: parse_optional_enum(map, ENV_LOG_LEVEL, "debug, info, warn, error")?,
            log_format: parse_optional_enum(map, ENV_LOG_FORMAT, "text, json")?,
            article_title_max_chars: parse_optional_u32(map, ENV_ARTICLE_TITLE_MAX_CHARS)?,
            article_max_tags: parse_optional_u32(map, ENV_ARTICLE_MAX_TAGS)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map = ALL_VARS
            .iter()
            .filter_map(|name| {
                std::env::var(name)
                    .ok()
                    .map(|value| ((*name).to_string(), value))
            })
            .collect();
        Self::from_map(&map)
    }
}

/// Apply env overrides on top of `config`, then validate and normalize.
pub fn apply_env_overrides(
    mut config: FormServiceConfig,
    env: &ConfigEnv,
) -> Result<ValidatedFormServiceConfig, ErrorEnvelope> {
    if let Some(provider) = env.storage_provider {
        config.storage.provider = provider;
    }
    if let Some(path) = env.storage_path.as_ref() {
        config.storage.path = Some(path.clone());
    }
    if let Some(level) = env.log_level {
        config.logging.level = level;
    }
    if let Some(format) = env.log_format {
        config.logging.format = format;
    }
    if let Some(value) = env.article_title_max_chars {
        config.article.title_max_chars = value;
    }
    if let Some(value) = env.article_max_tags {
        config.article.max_tags = value;
    }

    config.validate_and_normalize().map_err(ErrorEnvelope::from)
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned()))
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: trimmed,
        })
}

fn parse_optional_enum<T: FromStr>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    allowed: &'static str,
) -> Result<Option<T>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidEnum {
            var,
            value: trimmed,
            allowed,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn parses_all_overrides() -> Result<(), EnvParseError> {
        let env = ConfigEnv::from_map(&env_map(&[
            (ENV_STORAGE_PROVIDER, "SQLite"),
            (ENV_STORAGE_PATH, " /tmp/forms.db "),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_ARTICLE_TITLE_MAX_CHARS, "80"),
            (ENV_ARTICLE_MAX_TAGS, "3"),
        ]))?;

        assert_eq!(env.storage_provider, Some(StorageProvider::Sqlite));
        assert_eq!(env.storage_path.as_deref(), Some("/tmp/forms.db"));
        assert_eq!(env.log_level, Some(LogLevelSetting::Debug));
        assert_eq!(env.log_format, Some(LogFormat::Json));
        assert_eq!(env.article_title_max_chars, Some(80));
        assert_eq!(env.article_max_tags, Some(3));
        Ok(())
    }

    #[test]
    fn empty_and_malformed_values_fail_fast() {
        assert_eq!(
            ConfigEnv::from_map(&env_map(&[(ENV_STORAGE_PATH, "  ")])),
            Err(EnvParseError::EmptyValue {
                var: ENV_STORAGE_PATH
            })
        );
        assert!(matches!(
            ConfigEnv::from_map(&env_map(&[(ENV_ARTICLE_MAX_TAGS, "-1")])),
            Err(EnvParseError::InvalidInt { .. })
        ));
        assert!(matches!(
            ConfigEnv::from_map(&env_map(&[(ENV_STORAGE_PROVIDER, "postgres")])),
            Err(EnvParseError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn env_overrides_are_validated() {
        let env = ConfigEnv {
            storage_provider: Some(StorageProvider::Sqlite),
            ..ConfigEnv::default()
        };
        let result = apply_env_overrides(FormServiceConfig::default(), &env);
        assert!(matches!(result, Err(error) if error.code.code() == "missing_storage_path"));
    }

    #[test]
    fn env_errors_carry_var_metadata() {
        let envelope = ErrorEnvelope::from(EnvParseError::InvalidEnum {
            var: ENV_LOG_FORMAT,
            value: "xml".to_string(),
            allowed: "text, json",
        });
        assert_eq!(
            envelope.metadata.get("var").map(String::as_str),
            Some(ENV_LOG_FORMAT)
        );
        assert_eq!(envelope.metadata.get("value").map(String::as_str), Some("xml"));
    }
}
