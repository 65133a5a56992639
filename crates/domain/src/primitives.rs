//! Domain primitives with validated constructors.

use form_service_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::form::FormValue;

/// Validation failures for domain primitives.
///
/// These are structural failures raised while turning an already-validated
/// form into domain values. A well-configured validator rejects such input
/// first, so reaching one of these from a repository means the validator and
/// repository disagree about the form's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// A required field was absent or blank.
    MissingField {
        /// Field name.
        field: String,
    },
    /// A field had a value of the wrong type.
    InvalidFieldType {
        /// Field name.
        field: String,
        /// Expected type name.
        expected: &'static str,
    },
    /// `ArticleId` must be a positive integer.
    InvalidArticleId {
        /// Raw input rendered as text.
        input: String,
    },
    /// `Tag` is empty after normalization.
    EmptyTag {
        /// Length of the raw input before normalization.
        input_length: usize,
    },
    /// Form input could not be decoded from JSON.
    InvalidFormJson {
        /// Decoder message.
        message: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingField { .. } => ErrorCode::new("domain", "missing_field"),
            Self::InvalidFieldType { .. } => ErrorCode::new("domain", "invalid_field_type"),
            Self::InvalidArticleId { .. } => ErrorCode::new("domain", "invalid_article_id"),
            Self::EmptyTag { .. } => ErrorCode::new("domain", "invalid_tag"),
            Self::InvalidFormJson { .. } => ErrorCode::new("domain", "invalid_form_json"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(formatter, "{field} is required"),
            Self::InvalidFieldType { field, expected } => {
                write!(formatter, "{field} must be {expected}")
            },
            Self::InvalidArticleId { .. } => {
                formatter.write_str("ArticleId must be a positive integer")
            },
            Self::EmptyTag { .. } => formatter.write_str("Tag must be non-empty"),
            Self::InvalidFormJson { message } => {
                write!(formatter, "form input must be a JSON object: {message}")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::MissingField { field } => envelope.with_metadata("field", field),
            PrimitiveError::InvalidFieldType { field, expected } => envelope
                .with_metadata("field", field)
                .with_metadata("expected", expected),
            PrimitiveError::InvalidArticleId { input } => envelope.with_metadata("input", input),
            PrimitiveError::EmptyTag { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::InvalidFormJson { .. } => envelope,
        }
    }
}

/// Opaque identifier of a persisted article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(u64);

impl ArticleId {
    /// Create an id from a raw integer (must be positive).
    pub fn new(value: u64) -> Result<Self, PrimitiveError> {
        if value == 0 {
            return Err(PrimitiveError::InvalidArticleId {
                input: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Parse an id from a submitted form value (integer or numeric text).
    pub fn from_value(value: &FormValue) -> Result<Self, PrimitiveError> {
        let invalid = || PrimitiveError::InvalidArticleId {
            input: value.display(),
        };
        match value {
            FormValue::Integer(raw) => u64::try_from(*raw)
                .map_err(|_| invalid())
                .and_then(Self::new),
            FormValue::Text(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid())
                .and_then(Self::new),
            _ => Err(invalid()),
        }
    }

    /// Returns the raw integer.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Normalized tag label attached to articles.
///
/// Tags are trimmed, lowercased, and have inner whitespace collapsed to `-`,
/// so `" Rust  Tips "` and `"rust-tips"` name the same tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Box<str>);

impl Tag {
    /// Parse and normalize a tag.
    pub fn parse(input: &str) -> Result<Self, PrimitiveError> {
        let normalized = input
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        if normalized.is_empty() {
            return Err(PrimitiveError::EmptyTag {
                input_length: input.len(),
            });
        }
        Ok(Self(normalized.into_boxed_str()))
    }

    /// Borrow the normalized label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_id_rejects_zero_and_negative() {
        assert!(ArticleId::new(0).is_err());
        assert!(ArticleId::from_value(&FormValue::Integer(-4)).is_err());
        assert!(ArticleId::from_value(&FormValue::Bool(true)).is_err());
    }

    #[test]
    fn article_id_accepts_numeric_text() -> Result<(), PrimitiveError> {
        let id = ArticleId::from_value(&FormValue::Text(" 42 ".to_string()))?;
        assert_eq!(id.get(), 42);
        Ok(())
    }

    #[test]
    fn tag_normalizes_whitespace_and_case() -> Result<(), PrimitiveError> {
        let tag = Tag::parse("  Rust   Tips ")?;
        assert_eq!(tag.as_str(), "rust-tips");
        assert!(matches!(
            Tag::parse("   "),
            Err(PrimitiveError::EmptyTag { input_length: 3 })
        ));
        Ok(())
    }

    #[test]
    fn errors_map_into_envelopes_with_metadata() {
        let envelope: ErrorEnvelope = PrimitiveError::MissingField {
            field: "title".to_string(),
        }
        .into();
        assert_eq!(envelope.code.namespace(), "domain");
        assert_eq!(envelope.code.code(), "missing_field");
        assert_eq!(envelope.message, "title is required");
        assert_eq!(envelope.metadata.get("field").map(String::as_str), Some("title"));
    }
}
