//! # form-service-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `app`, `adapters`, `config`, `ports`, and `shared`.

/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Form service wiring.
pub mod form_factory;
/// Article store selection.
pub mod store_factory;

pub use config_check::{load_effective_config, load_effective_config_json};
pub use form_factory::{
    build_form_service_deps, build_logger, form_service_deps_for_store, log_level,
};
pub use store_factory::{ArticleStore, open_article_store};

// Re-exported so binaries only need the infra crate for wiring.
pub use form_service_adapters::ArticleFormMode;
pub use form_service_shared::{is_secret_key, redact_if_secret};

/// Infra-level error type (shared error envelope).
pub type InfraError = form_service_shared::ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
