//! Config loading helpers for CLI surfaces.

use crate::InfraResult;
use form_service_config::{
    ConfigEnv, ValidatedFormServiceConfig, load_config_from_path, to_pretty_json,
};
use form_service_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::path::Path;

/// Load and validate the effective config from an env map and optional file.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<ValidatedFormServiceConfig> {
    let env = ConfigEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_config_from_path(config_path, &env)
}

/// Load and validate the effective config, returning deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<String> {
    let config = load_effective_config(env, config_path)?;
    to_pretty_json(&config)
}
