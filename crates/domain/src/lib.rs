//! # form-service-domain
//!
//! Domain types for form processing:
//!
//! - **Form** - `FormInput`, `FormValue` (raw, untrusted submissions)
//! - **Validation** - `FieldErrors`, `ValidationOutcome`
//! - **Articles** - `Article`, `ArticleDraft`, `ArticleId`, `Tag`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use form_service_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod article;
pub mod form;
pub mod primitives;
pub mod validation;

pub use article::{
    Article, ArticleDraft, FIELD_CONTENT, FIELD_ID, FIELD_TAGS, FIELD_TITLE,
    article_id_from_input,
};
pub use form::{FormInput, FormValue};
pub use primitives::{ArticleId, PrimitiveError, Tag};
pub use validation::{FORM_FIELD, FieldErrors, ValidationOutcome};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
