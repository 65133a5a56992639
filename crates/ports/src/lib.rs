//! # form-service-ports
//!
//! Port traits for the form-service hexagonal architecture.
//!
//! This crate defines the interfaces between the application layer and the
//! adapters that validate and persist submissions. It depends only on
//! `domain` and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod forms;
pub mod logger;

pub use forms::*;
pub use logger::*;

// Re-export domain types used in port signatures, so adapter crates can
// implement ports without directly depending on `form-service-domain`.
pub use form_service_domain::{
    Article, ArticleId, FieldErrors, FormInput, FormValue, ValidationOutcome,
};

#[cfg(test)]
mod tests {
    use super::*;
    use form_service_domain::domain_crate_version;
    use form_service_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
                continue;
            }
            if in_deps && line.starts_with("form-service-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn ports_depends_only_on_domain_and_shared() {
        let deps = workspace_deps();
        let allowed = ["form-service-domain", "form-service-shared"];

        for dep in &deps {
            assert!(
                allowed.contains(&dep.as_str()),
                "unexpected dependency found: {dep}"
            );
        }

        for expected in allowed {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }

    struct Fixed(Vec<Article>);

    impl ArticleLookupPort for Fixed {
        fn find(&self, id: ArticleId) -> form_service_shared::Result<Option<Article>> {
            Ok(self.0.iter().find(|article| article.id == id).cloned())
        }

        fn list(&self) -> form_service_shared::Result<Vec<Article>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn latest_defaults_to_highest_id() -> Result<(), Box<dyn std::error::Error>> {
        let article = |id: u64| -> Result<Article, form_service_domain::PrimitiveError> {
            Ok(Article {
                id: ArticleId::new(id)?,
                title: format!("article {id}"),
                content: String::new(),
                tags: Vec::new(),
            })
        };
        let lookup = Fixed(vec![article(2)?, article(5)?, article(3)?]);

        let latest = lookup.latest()?.map(|article| article.id.get());
        assert_eq!(latest, Some(5));
        assert_eq!(Fixed(Vec::new()).latest()?, None);
        Ok(())
    }
}
