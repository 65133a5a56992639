//! Article repository selection and initialization.

use crate::InfraResult;
use form_service_adapters::{InMemoryArticleRepository, SqliteArticleRepository};
use form_service_config::{StorageProvider, ValidatedFormServiceConfig};
use form_service_ports::{ArticleLookupPort, RepositoryPort};
use form_service_shared::{ErrorCode, ErrorEnvelope};
use std::sync::Arc;

/// Write and read handles onto one article store.
#[derive(Clone)]
pub struct ArticleStore {
    /// Provider the store was opened with.
    pub provider: StorageProvider,
    /// Write side, handed to the form service.
    pub repository: Arc<dyn RepositoryPort>,
    /// Read side, used to render results.
    pub lookup: Arc<dyn ArticleLookupPort>,
}

impl ArticleStore {
    fn shared<T>(provider: StorageProvider, store: Arc<T>) -> Self
    where
        T: RepositoryPort + ArticleLookupPort + 'static,
    {
        Self {
            provider,
            repository: store.clone(),
            lookup: store,
        }
    }
}

/// Open the article store selected by `storage.provider`.
pub fn open_article_store(config: &ValidatedFormServiceConfig) -> InfraResult<ArticleStore> {
    let provider = config.storage.provider;
    match provider {
        StorageProvider::Memory => {
            tracing::debug!("opening in-memory article store");
            Ok(ArticleStore::shared(provider, Arc::new(InMemoryArticleRepository::new())))
        },
        StorageProvider::Sqlite => {
            // Validation guarantees a path for sqlite; re-check rather than panic.
            let path = config.storage.path.as_deref().ok_or_else(|| {
                ErrorEnvelope::expected(
                    ErrorCode::new("config", "missing_storage_path"),
                    "storage.path is required when storage.provider is `sqlite`",
                )
            })?;
            tracing::debug!(path, "opening sqlite article store");
            let repository = SqliteArticleRepository::open(path)?;
            Ok(ArticleStore::shared(provider, Arc::new(repository)))
        },
    }
}
