//! Configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims string fields so that equivalent files compare equal.

use form_service_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

const TITLE_MAX_CHARS_MIN: u32 = 1;
const TITLE_MAX_CHARS_MAX: u32 = 1_000;
const CONTENT_MAX_CHARS_MIN: u32 = 1;
const CONTENT_MAX_CHARS_MAX: u32 = 1_000_000;
const MAX_TAGS_MIN: u32 = 0;
const MAX_TAGS_MAX: u32 = 100;
const TAG_MAX_CHARS_MIN: u32 = 1;
const TAG_MAX_CHARS_MAX: u32 = 128;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FormServiceConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Article form rules.
    pub article: ArticleRulesConfig,
    /// Repository backend selection.
    pub storage: StorageConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

impl Default for FormServiceConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            article: ArticleRulesConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Validation rules applied to the article form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ArticleRulesConfig {
    /// Maximum title length in characters.
    pub title_max_chars: u32,
    /// Whether `content` must be present and non-blank.
    pub content_required: bool,
    /// Maximum content length in characters.
    pub content_max_chars: u32,
    /// Maximum number of tags per article.
    pub max_tags: u32,
    /// Maximum length of a single tag.
    pub tag_max_chars: u32,
}

impl Default for ArticleRulesConfig {
    fn default() -> Self {
        Self {
            title_max_chars: 255,
            content_required: true,
            content_max_chars: 65_535,
            max_tags: 10,
            tag_max_chars: 32,
        }
    }
}

/// Repository backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    /// Process-local map; contents are lost on exit.
    #[default]
    Memory,
    /// SQLite file at `storage.path`.
    Sqlite,
}

impl StorageProvider {
    /// Config/env spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

impl FromStr for StorageProvider {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StorageProvider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct StorageConfig {
    /// Backend selection.
    pub provider: StorageProvider,
    /// Database path (required for `sqlite`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Minimum log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelSetting {
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warn and above.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevelSetting {
    /// Lowercase spelling, also valid as a `tracing` filter directive.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevelSetting {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(()),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Minimum level.
    pub level: LogLevelSetting,
    /// Output format.
    pub format: LogFormat,
}

/// Schema-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigSchemaError {
    /// Config version is not supported.
    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build understands.
        supported: u32,
    },
    /// A numeric field is outside its allowed range.
    #[error("{section}.{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// Config section.
        section: &'static str,
        /// Field name (camelCase).
        field: &'static str,
        /// Offending value.
        value: u64,
        /// Inclusive minimum.
        min: u64,
        /// Inclusive maximum.
        max: u64,
    },
    /// `storage.path` is required for the selected provider.
    #[error("storage.path is required when storage.provider is `{provider}`")]
    MissingStoragePath {
        /// Selected provider.
        provider: StorageProvider,
    },
}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let message = error.to_string();
        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => Self::expected(
                ErrorCode::new("config", "unsupported_version"),
                message,
            )
            .with_metadata("found", found.to_string())
            .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::OutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => Self::expected(ErrorCode::new("config", "out_of_range"), message)
                .with_metadata("field", format!("{section}.{field}"))
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::MissingStoragePath { provider } => {
                Self::expected(ErrorCode::new("config", "missing_storage_path"), message)
                    .with_metadata("provider", provider.as_str())
            },
        }
    }
}

impl FormServiceConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(
        mut self,
    ) -> Result<ValidatedFormServiceConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        self.article.validate()?;
        self.storage.normalize();
        self.storage.validate()?;

        Ok(ValidatedFormServiceConfig { raw: self })
    }
}

impl ArticleRulesConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        bounded(
            "article",
            "titleMaxChars",
            self.title_max_chars,
            TITLE_MAX_CHARS_MIN,
            TITLE_MAX_CHARS_MAX,
        )?;
        bounded(
            "article",
            "contentMaxChars",
            self.content_max_chars,
            CONTENT_MAX_CHARS_MIN,
            CONTENT_MAX_CHARS_MAX,
        )?;
        bounded("article", "maxTags", self.max_tags, MAX_TAGS_MIN, MAX_TAGS_MAX)?;
        bounded(
            "article",
            "tagMaxChars",
            self.tag_max_chars,
            TAG_MAX_CHARS_MIN,
            TAG_MAX_CHARS_MAX,
        )?;
        Ok(())
    }
}

impl StorageConfig {
    fn normalize(&mut self) {
        self.path = self
            .path
            .take()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty());
    }

    const fn validate(&self) -> Result<(), ConfigSchemaError> {
        if matches!(self.provider, StorageProvider::Sqlite) && self.path.is_none() {
            return Err(ConfigSchemaError::MissingStoragePath {
                provider: self.provider,
            });
        }
        Ok(())
    }
}

const fn bounded(
    section: &'static str,
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), ConfigSchemaError> {
    if value < min || value > max {
        return Err(ConfigSchemaError::OutOfRange {
            section,
            field,
            value: value as u64,
            min: min as u64,
            max: max as u64,
        });
    }
    Ok(())
}

/// Config that passed [`FormServiceConfig::validate_and_normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFormServiceConfig {
    raw: FormServiceConfig,
}

impl ValidatedFormServiceConfig {
    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> FormServiceConfig {
        self.raw
    }
}

impl AsRef<FormServiceConfig> for ValidatedFormServiceConfig {
    fn as_ref(&self) -> &FormServiceConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedFormServiceConfig {
    type Target = FormServiceConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse and validate a JSON config document.
pub fn parse_config_json(input: &str) -> Result<ValidatedFormServiceConfig, ErrorEnvelope> {
    let config: FormServiceConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(ErrorEnvelope::from)
}

/// Parse and validate a TOML config document.
pub fn parse_config_toml(input: &str) -> Result<ValidatedFormServiceConfig, ErrorEnvelope> {
    let config: FormServiceConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(ErrorEnvelope::from)
}

/// JSON Schema describing [`FormServiceConfig`].
#[must_use]
pub fn config_schema() -> schemars::Schema {
    schemars::schema_for!(FormServiceConfig)
}

/// [`config_schema`] as pretty JSON with a trailing newline.
pub fn config_schema_json() -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(&config_schema()).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config schema: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}
