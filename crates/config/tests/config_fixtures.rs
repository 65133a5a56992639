//! Integration tests for parsing and loading config fixtures.

use form_service_config::{
    CURRENT_CONFIG_VERSION, ConfigEnv, ConfigFormat, LogFormat, LogLevelSetting, StorageProvider,
    load_config_from_path, load_config_from_sources, parse_config_json, parse_config_toml,
    to_pretty_json,
};
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixture_path(name))?)
}

#[test]
fn parses_valid_fixture_and_normalizes() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("forms.valid.json")?;
    let config = parse_config_json(&contents)?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(config.article.title_max_chars, 120);
    assert!(!config.article.content_required);
    assert_eq!(config.article.max_tags, 5);
    assert_eq!(config.article.tag_max_chars, 32, "unset rules keep defaults");
    assert_eq!(config.storage.provider, StorageProvider::Sqlite);
    assert_eq!(
        config.storage.path.as_deref(),
        Some("data/articles.db"),
        "path should be trimmed"
    );
    assert_eq!(config.logging.level, LogLevelSetting::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
    Ok(())
}

#[test]
fn default_toml_fixture_matches_defaults() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("forms.default.toml")?;
    let config = parse_config_toml(&contents)?;

    assert_eq!(config.into_inner(), form_service_config::FormServiceConfig::default());
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("forms.unknown-field.json")?;
    let error = parse_config_json(&contents).err();

    assert_eq!(
        error.map(|error| error.code.code().to_owned()),
        Some("invalid_json".to_owned())
    );
    Ok(())
}

#[test]
fn load_from_path_applies_env_overrides() -> Result<(), Box<dyn Error>> {
    let mut vars = BTreeMap::new();
    vars.insert("FORMS_STORAGE_PATH".to_owned(), "/var/lib/forms.db".to_owned());
    vars.insert("FORMS_ARTICLE_MAX_TAGS".to_owned(), "2".to_owned());
    let env = ConfigEnv::from_map(&vars)?;

    let config = load_config_from_path(Some(&fixture_path("forms.valid.json")), &env)?;

    assert_eq!(config.storage.path.as_deref(), Some("/var/lib/forms.db"));
    assert_eq!(config.article.max_tags, 2);
    assert_eq!(config.article.title_max_chars, 120);
    Ok(())
}

#[test]
fn out_of_range_env_override_reports_field() -> Result<(), Box<dyn Error>> {
    let mut vars = BTreeMap::new();
    vars.insert("FORMS_ARTICLE_TITLE_MAX_CHARS".to_owned(), "0".to_owned());
    let env = ConfigEnv::from_map(&vars)?;

    let error = load_config_from_sources(None, &env).err();
    let field = error
        .as_ref()
        .and_then(|error| error.metadata.get("field"))
        .cloned();

    assert_eq!(field.as_deref(), Some("article.titleMaxChars"));
    Ok(())
}

#[test]
fn pretty_json_is_stable_and_reloadable() -> Result<(), Box<dyn Error>> {
    let config = load_config_from_sources(None, &ConfigEnv::default())?;
    let first = to_pretty_json(&config)?;
    let reloaded =
        load_config_from_sources(Some((&first, ConfigFormat::Json)), &ConfigEnv::default())?;
    let second = to_pretty_json(&reloaded)?;

    assert_eq!(first, second);
    assert!(first.ends_with('\n'));
    Ok(())
}
