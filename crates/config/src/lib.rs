//! # form-service-config
//!
//! Configuration schema, validation, and loading for the form service.
//! This crate depends on `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    ConfigEnv, ENV_ARTICLE_MAX_TAGS, ENV_ARTICLE_TITLE_MAX_CHARS, ENV_LOG_FORMAT, ENV_LOG_LEVEL,
    ENV_STORAGE_PATH, ENV_STORAGE_PROVIDER, EnvParseError, apply_env_overrides,
};
pub use load::{
    ConfigFormat, load_config_from_path, load_config_from_sources, load_config_std_env,
    to_pretty_json, to_pretty_toml,
};
pub use schema::{
    ArticleRulesConfig, CURRENT_CONFIG_VERSION, ConfigSchemaError, FormServiceConfig, LogFormat,
    LogLevelSetting, LoggingConfig, StorageConfig, StorageProvider, ValidatedFormServiceConfig,
    config_schema, config_schema_json, parse_config_json, parse_config_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
