//! Process-local article repository.

use form_service_domain::{ArticleDraft, article_id_from_input};
use form_service_ports::{Article, ArticleId, ArticleLookupPort, FormInput, RepositoryPort};
use form_service_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct MemoryState {
    last_id: u64,
    articles: BTreeMap<ArticleId, Article>,
}

/// Article repository backed by an in-process map.
///
/// Ids are assigned monotonically and never reused. Tags are replaced as a
/// whole on update.
#[derive(Debug, Default)]
pub struct InMemoryArticleRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryArticleRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored articles.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.articles.len())
    }

    /// Returns true when nothing is stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state.read().map_err(|_| lock_poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state.write().map_err(|_| lock_poisoned())
    }
}

impl RepositoryPort for InMemoryArticleRepository {
    fn create(&self, input: &FormInput) -> Result<bool> {
        let draft = ArticleDraft::from_input(input).map_err(ErrorEnvelope::from)?;
        let mut state = self.write()?;

        let next = state.last_id.checked_add(1).ok_or_else(|| {
            ErrorEnvelope::invariant(
                ErrorCode::new("repository", "id_exhausted"),
                "article id space exhausted",
            )
        })?;
        let id = ArticleId::new(next).map_err(ErrorEnvelope::from)?;
        state.last_id = next;
        state.articles.insert(id, Article::from_draft(id, draft));

        tracing::debug!(article_id = %id, "memory repository created article");
        Ok(true)
    }

    fn update(&self, input: &FormInput) -> Result<bool> {
        let id = article_id_from_input(input).map_err(ErrorEnvelope::from)?;
        let draft = ArticleDraft::from_input(input).map_err(ErrorEnvelope::from)?;
        let mut state = self.write()?;

        let Some(article) = state.articles.get_mut(&id) else {
            tracing::debug!(article_id = %id, "memory repository update of unknown article");
            return Ok(false);
        };
        *article = Article::from_draft(id, draft);
        Ok(true)
    }
}

impl ArticleLookupPort for InMemoryArticleRepository {
    fn find(&self, id: ArticleId) -> Result<Option<Article>> {
        Ok(self.read()?.articles.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Article>> {
        Ok(self.read()?.articles.values().cloned().collect())
    }

    fn latest(&self) -> Result<Option<Article>> {
        Ok(self.read()?.articles.values().next_back().cloned())
    }
}

fn lock_poisoned() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("repository", "lock_poisoned"),
        "memory repository lock poisoned",
        ErrorClass::NonRetriable,
    )
}
