//! Validation and persistence boundary contracts used by form processing.

use form_service_domain::{Article, ArticleId, FormInput, ValidationOutcome};
use form_service_shared::Result;

/// Checks submitted input against a rule set.
///
/// Validation failure is an ordinary outcome, never an error: implementations
/// report it through [`ValidationOutcome`].
pub trait ValidatorPort: Send + Sync {
    /// Validate a submission.
    fn validate(&self, input: &FormInput) -> ValidationOutcome;
}

/// Performs create/update writes for a domain entity.
///
/// `Ok(false)` is a soft refusal (e.g. updating an id that does not exist).
/// `Err` is reserved for failures the caller cannot fix by correcting the
/// input, such as a broken storage engine.
pub trait RepositoryPort: Send + Sync {
    /// Create a record from validated input.
    fn create(&self, input: &FormInput) -> Result<bool>;

    /// Update the record identified by the input.
    fn update(&self, input: &FormInput) -> Result<bool>;
}

/// Read access to persisted articles, for callers rendering results.
pub trait ArticleLookupPort: Send + Sync {
    /// Find one article by id.
    fn find(&self, id: ArticleId) -> Result<Option<Article>>;

    /// List all articles ordered by id.
    fn list(&self) -> Result<Vec<Article>>;

    /// The most recently created article, if any.
    fn latest(&self) -> Result<Option<Article>> {
        Ok(self.list()?.into_iter().max_by_key(|article| article.id))
    }
}
