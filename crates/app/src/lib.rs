//! # form-service-app
//!
//! Application use cases for form processing.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod form_service;

pub use form_service::{FormOutcome, FormService, FormServiceDeps};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_service_domain::domain_crate_version;
    use form_service_ports::ports_crate_version;
    use form_service_shared::shared_crate_version;

    #[test]
    fn app_can_use_ports_domain_shared() {
        assert!(!app_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
