//! Article entity and the draft extracted from a submitted article form.

use crate::form::{FormInput, FormValue};
use crate::primitives::{ArticleId, PrimitiveError, Tag};
use serde::{Deserialize, Serialize};

/// Form field carrying the article id (update only).
pub const FIELD_ID: &str = "id";
/// Form field carrying the title.
pub const FIELD_TITLE: &str = "title";
/// Form field carrying the body.
pub const FIELD_CONTENT: &str = "content";
/// Form field carrying tags (list or comma-separated text).
pub const FIELD_TAGS: &str = "tags";

/// Article values extracted from a form, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    /// Trimmed title.
    pub title: String,
    /// Body text (may be empty).
    pub content: String,
    /// Deduplicated tags in submission order.
    pub tags: Vec<Tag>,
}

impl ArticleDraft {
    /// Extract a draft from form input.
    pub fn from_input(input: &FormInput) -> Result<Self, PrimitiveError> {
        let title = required_text(input, FIELD_TITLE)?;
        let content = optional_text(input, FIELD_CONTENT)?.unwrap_or_default();
        let tags = parse_tags(input.get(FIELD_TAGS))?;
        Ok(Self {
            title,
            content,
            tags,
        })
    }
}

/// Persisted article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Repository-assigned id.
    pub id: ArticleId,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Associated tags.
    pub tags: Vec<Tag>,
}

impl Article {
    /// Build an article from an id and draft.
    #[must_use]
    pub fn from_draft(id: ArticleId, draft: ArticleDraft) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            tags: draft.tags,
        }
    }
}

/// Read the `id` field of an update form.
pub fn article_id_from_input(input: &FormInput) -> Result<ArticleId, PrimitiveError> {
    let value = input
        .get(FIELD_ID)
        .filter(|value| !value.is_blank())
        .ok_or_else(|| PrimitiveError::MissingField {
            field: FIELD_ID.to_string(),
        })?;
    ArticleId::from_value(value)
}

fn required_text(input: &FormInput, field: &str) -> Result<String, PrimitiveError> {
    optional_text(input, field)?
        .filter(|value| !value.is_empty())
        .ok_or_else(|| PrimitiveError::MissingField {
            field: field.to_string(),
        })
}

fn optional_text(input: &FormInput, field: &str) -> Result<Option<String>, PrimitiveError> {
    match input.get(field) {
        None | Some(FormValue::Null) => Ok(None),
        Some(FormValue::Text(value)) => Ok(Some(value.trim().to_string())),
        Some(_) => Err(PrimitiveError::InvalidFieldType {
            field: field.to_string(),
            expected: "text",
        }),
    }
}

fn parse_tags(value: Option<&FormValue>) -> Result<Vec<Tag>, PrimitiveError> {
    let raw: Vec<&str> = match value {
        None | Some(FormValue::Null) => Vec::new(),
        Some(FormValue::List(values)) => values.iter().map(String::as_str).collect(),
        Some(FormValue::Text(value)) => value.split(',').collect(),
        Some(_) => {
            return Err(PrimitiveError::InvalidFieldType {
                field: FIELD_TAGS.to_string(),
                expected: "a list of tags",
            });
        },
    };

    let mut tags: Vec<Tag> = Vec::with_capacity(raw.len());
    for label in raw.into_iter().filter(|label| !label.trim().is_empty()) {
        let tag = Tag::parse(label)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_trims_and_dedupes_tags() -> Result<(), PrimitiveError> {
        let input = FormInput::new()
            .with(FIELD_TITLE, "  Hello ")
            .with(FIELD_CONTENT, "Body")
            .with(FIELD_TAGS, "Rust, rust , ,Web Dev");
        let draft = ArticleDraft::from_input(&input)?;

        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.content, "Body");
        let tags: Vec<&str> = draft.tags.iter().map(Tag::as_str).collect();
        assert_eq!(tags, vec!["rust", "web-dev"]);
        Ok(())
    }

    #[test]
    fn draft_requires_title() {
        let input = FormInput::new().with(FIELD_TITLE, "   ");
        assert_eq!(
            ArticleDraft::from_input(&input),
            Err(PrimitiveError::MissingField {
                field: FIELD_TITLE.to_string()
            })
        );
    }

    #[test]
    fn draft_rejects_wrongly_typed_content() {
        let input = FormInput::new()
            .with(FIELD_TITLE, "T")
            .with(FIELD_CONTENT, 5_i64);
        assert!(matches!(
            ArticleDraft::from_input(&input),
            Err(PrimitiveError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn update_id_is_read_from_input() -> Result<(), PrimitiveError> {
        let input = FormInput::new().with(FIELD_ID, 999_i64);
        assert_eq!(article_id_from_input(&input)?.get(), 999);

        assert!(matches!(
            article_id_from_input(&FormInput::new()),
            Err(PrimitiveError::MissingField { .. })
        ));
        Ok(())
    }
}
