//! Validation outcome types shared by validators and the form service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name used when a failure does not belong to a specific field.
pub const FORM_FIELD: &str = "_form";

/// Field name -> human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Builder-style [`Self::add`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// Append every message from `other`.
    pub fn merge(&mut self, other: Self) {
        for (field, mut messages) in other.0 {
            self.0.entry(field).or_default().append(&mut messages);
        }
    }

    /// Messages for a single field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message for a field, if any.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(<[String]>::first)
            .map(String::as_str)
    }

    /// Returns true when a field has at least one message.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.get(field).is_some_and(|messages| !messages.is_empty())
    }

    /// Iterate `(field, messages)` in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// All messages flattened in field order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.values().flatten().map(String::as_str)
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, M> FromIterator<(K, M)> for FieldErrors
where
    K: Into<String>,
    M: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, M)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.add(field, message);
        }
        errors
    }
}

/// Pass/fail result of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    errors: FieldErrors,
}

impl ValidationOutcome {
    /// A passing outcome (no errors).
    #[must_use]
    pub fn passed() -> Self {
        Self {
            errors: FieldErrors::new(),
        }
    }

    /// A failing outcome.
    ///
    /// An empty map would read as a pass, so it is replaced by a generic
    /// form-level message.
    #[must_use]
    pub fn failed(errors: FieldErrors) -> Self {
        if errors.is_empty() {
            return Self {
                errors: FieldErrors::new().with(FORM_FIELD, "the submission is invalid"),
            };
        }
        Self { errors }
    }

    /// Pass when `errors` is empty, fail otherwise.
    #[must_use]
    pub fn from_errors(errors: FieldErrors) -> Self {
        Self { errors }
    }

    /// Returns true when validation passed.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Borrow the field errors (empty on pass).
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Take the field errors.
    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}
