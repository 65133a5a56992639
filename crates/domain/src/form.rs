//! Raw form input as submitted by a caller.

use crate::primitives::PrimitiveError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A single submitted field value.
///
/// Untagged so that a flat JSON object (`{"title": "Hi", "id": 3}`) decodes
/// directly into a [`FormInput`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Explicit null / absent value.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Multi-valued field (e.g. a tag list).
    List(Vec<String>),
}

impl FormValue {
    /// Borrow the value as text when it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value as an integer, accepting integer-looking text.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns true for null, whitespace-only text, and empty lists.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(value) => value.trim().is_empty(),
            Self::List(values) => values.iter().all(|value| value.trim().is_empty()),
            Self::Bool(_) | Self::Integer(_) | Self::Float(_) => false,
        }
    }

    /// Render the value for messages and text output.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.clone(),
            Self::List(values) => values.join(", "),
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for FormValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

/// Field name -> submitted value mapping, constructed per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormInput(BTreeMap<String, FormValue>);

impl FormInput {
    /// Create an empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a flat JSON object.
    pub fn from_json_str(input: &str) -> Result<Self, PrimitiveError> {
        serde_json::from_str(input).map_err(|error| PrimitiveError::InvalidFormJson {
            message: error.to_string(),
        })
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Insert or replace a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FormValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Look up a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FormValue> {
        self.0.get(field)
    }

    /// Look up a field as text.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FormValue::as_text)
    }

    /// Returns true when the field was submitted (even if blank).
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FormValue> {
        self.0.iter()
    }

    /// Field names in name order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of submitted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when nothing was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormInput
where
    K: Into<String>,
    V: Into<FormValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a FormInput {
    type Item = (&'a String, &'a FormValue);
    type IntoIter = btree_map::Iter<'a, String, FormValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
