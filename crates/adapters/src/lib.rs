//! # form-service-adapters
//!
//! Adapter implementations for ports: rule-based validation, article
//! repositories (in-memory and SQLite), and structured loggers.
//! This crate depends on `ports`, `shared`, `domain`, and `config`.

pub mod log_sink;
pub mod logger;
pub mod memory;
pub mod sqlite;
pub mod tracing_logger;
pub mod validator;

pub use log_sink::{BufferLogSink, LogSink, StderrLogSink};
pub use logger::JsonLogger;
pub use memory::InMemoryArticleRepository;
pub use sqlite::SqliteArticleRepository;
pub use tracing_logger::TracingLogger;
pub use validator::{ArticleFormMode, FieldRule, RulesValidator};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
