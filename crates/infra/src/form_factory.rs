//! Form service wiring: validator, repository, and logger selection.

use crate::InfraResult;
use crate::store_factory::{ArticleStore, open_article_store};
use form_service_adapters::{
    ArticleFormMode, JsonLogger, RulesValidator, StderrLogSink, TracingLogger,
};
use form_service_app::FormServiceDeps;
use form_service_config::{LogFormat, LogLevelSetting, LoggingConfig, ValidatedFormServiceConfig};
use form_service_ports::{LogLevel, LoggerPort, log_fields};
use std::sync::Arc;

/// Build form service dependencies together with the store they write to.
///
/// The returned [`ArticleStore`] shares state with `deps.repository`, so a
/// caller can read back what the service persisted.
pub fn build_form_service_deps(
    config: &ValidatedFormServiceConfig,
    mode: ArticleFormMode,
    logger: Option<Arc<dyn LoggerPort>>,
) -> InfraResult<(FormServiceDeps, ArticleStore)> {
    let store = open_article_store(config)?;
    let deps = form_service_deps_for_store(config, &store, mode, logger);
    Ok((deps, store))
}

/// Build form service dependencies against an already opened store.
#[must_use]
pub fn form_service_deps_for_store(
    config: &ValidatedFormServiceConfig,
    store: &ArticleStore,
    mode: ArticleFormMode,
    logger: Option<Arc<dyn LoggerPort>>,
) -> FormServiceDeps {
    let logger = logger.map(|logger| {
        let scope = match mode {
            ArticleFormMode::Create => "create",
            ArticleFormMode::Update => "update",
        };
        Arc::from(logger.child(log_fields([("form", "article"), ("mode", scope)])))
    });

    FormServiceDeps {
        validator: Arc::new(RulesValidator::for_article(&config.article, mode)),
        repository: Arc::clone(&store.repository),
        logger,
    }
}

/// Logger matching `logging.format`: JSON lines to stderr, or `tracing`.
#[must_use]
pub fn build_logger(config: &LoggingConfig) -> Arc<dyn LoggerPort> {
    match config.format {
        LogFormat::Json => Arc::new(
            JsonLogger::new(Arc::new(StderrLogSink)).with_min_level(log_level(config.level)),
        ),
        LogFormat::Text => Arc::new(TracingLogger::new()),
    }
}

/// Map the config level onto the port level.
#[must_use]
pub const fn log_level(level: LogLevelSetting) -> LogLevel {
    match level {
        LogLevelSetting::Debug => LogLevel::Debug,
        LogLevelSetting::Info => LogLevel::Info,
        LogLevelSetting::Warn => LogLevel::Warn,
        LogLevelSetting::Error => LogLevel::Error,
    }
}
