//! Rule-based validator adapter.
//!
//! Rules are typed values rather than a string DSL. Each field carries an
//! ordered rule list; all failing rules of a field are reported, except that a
//! failed [`FieldRule::Required`] hides the rest for that field.

use form_service_config::ArticleRulesConfig;
use form_service_domain::{FIELD_CONTENT, FIELD_ID, FIELD_TAGS, FIELD_TITLE};
use form_service_ports::{FieldErrors, FormInput, FormValue, ValidationOutcome, ValidatorPort};

/// A single check applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Field must be present and non-blank.
    Required,
    /// Value must be text.
    Text,
    /// Text must have at least `n` characters (after trimming).
    MinChars(usize),
    /// Text must have at most `n` characters (after trimming).
    MaxChars(usize),
    /// Value must be an integer (or integer-looking text).
    Integer,
    /// Value must be an integer greater than zero.
    PositiveInteger,
    /// List (or comma-separated text) must have at most `n` entries.
    MaxItems(usize),
    /// Every list entry must have at most `n` characters.
    ItemMaxChars(usize),
}

impl FieldRule {
    /// Returns the failure message for `field`, or `None` when `value` passes.
    #[must_use]
    pub fn check(self, field: &str, value: &FormValue) -> Option<String> {
        match self {
            Self::Required => value
                .is_blank()
                .then(|| format!("{field} is required")),
            Self::Text => value
                .as_text()
                .is_none()
                .then(|| format!("{field} must be a string")),
            Self::MinChars(min) => (char_count(value) < min)
                .then(|| format!("{field} must be at least {min} characters")),
            Self::MaxChars(max) => (char_count(value) > max)
                .then(|| format!("{field} may not be greater than {max} characters")),
            Self::Integer => value
                .as_integer()
                .is_none()
                .then(|| format!("{field} must be an integer")),
            Self::PositiveInteger => value
                .as_integer()
                .is_none_or(|number| number <= 0)
                .then(|| format!("{field} must be a positive integer")),
            Self::MaxItems(max) => match items(value) {
                None => Some(format!("{field} must be a list")),
                Some(entries) if entries.len() > max => {
                    Some(format!("{field} may not have more than {max} items"))
                },
                Some(_) => None,
            },
            Self::ItemMaxChars(max) => match items(value) {
                None => Some(format!("{field} must be a list")),
                Some(entries) => entries
                    .iter()
                    .any(|entry| entry.chars().count() > max)
                    .then(|| {
                        format!("each {field} entry may not be greater than {max} characters")
                    }),
            },
        }
    }
}

/// Which article flow a validator is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleFormMode {
    /// New article; no id is submitted.
    Create,
    /// Existing article; `id` is required.
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldSpec {
    field: String,
    rules: Vec<FieldRule>,
}

/// Validator driven by an ordered list of per-field rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesValidator {
    fields: Vec<FieldSpec>,
}

impl RulesValidator {
    /// Empty validator (every input passes).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for a field. Fields are checked in insertion order.
    #[must_use]
    pub fn field(
        mut self,
        field: impl Into<String>,
        rules: impl IntoIterator<Item = FieldRule>,
    ) -> Self {
        self.fields.push(FieldSpec {
            field: field.into(),
            rules: rules.into_iter().collect(),
        });
        self
    }

    /// Rules for the article form, derived from config limits.
    #[must_use]
    pub fn for_article(rules: &ArticleRulesConfig, mode: ArticleFormMode) -> Self {
        let mut validator = Self::new();
        if mode == ArticleFormMode::Update {
            validator =
                validator.field(FIELD_ID, [FieldRule::Required, FieldRule::PositiveInteger]);
        }

        let mut content_rules = Vec::with_capacity(3);
        if rules.content_required {
            content_rules.push(FieldRule::Required);
        }
        content_rules.extend([
            FieldRule::Text,
            FieldRule::MaxChars(limit(rules.content_max_chars)),
        ]);

        validator
            .field(
                FIELD_TITLE,
                [
                    FieldRule::Required,
                    FieldRule::Text,
                    FieldRule::MaxChars(limit(rules.title_max_chars)),
                ],
            )
            .field(FIELD_CONTENT, content_rules)
            .field(
                FIELD_TAGS,
                [
                    FieldRule::MaxItems(limit(rules.max_tags)),
                    FieldRule::ItemMaxChars(limit(rules.tag_max_chars)),
                ],
            )
    }

    /// Names of the fields this validator checks, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|spec| spec.field.as_str())
    }
}

impl ValidatorPort for RulesValidator {
    fn validate(&self, input: &FormInput) -> ValidationOutcome {
        let mut errors = FieldErrors::new();

        for spec in &self.fields {
            let value = input.get(&spec.field).unwrap_or(&FormValue::Null);
            if spec.rules.contains(&FieldRule::Required) && value.is_blank() {
                errors.add(&spec.field, format!("{} is required", spec.field));
                continue;
            }
            if is_absent(value) {
                // Absent optional fields skip their rules.
                continue;
            }

            for rule in &spec.rules {
                if let Some(message) = rule.check(&spec.field, value) {
                    errors.add(&spec.field, message);
                }
            }
        }

        ValidationOutcome::from_errors(errors)
    }
}

/// Null or whitespace-only text. A blank list is still a submitted value, so
/// type rules such as [`FieldRule::Text`] see it.
fn is_absent(value: &FormValue) -> bool {
    match value {
        FormValue::Null => true,
        FormValue::Text(text) => text.trim().is_empty(),
        FormValue::Bool(_) | FormValue::Integer(_) | FormValue::Float(_) | FormValue::List(_) => {
            false
        },
    }
}

fn limit(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn char_count(value: &FormValue) -> usize {
    match value {
        FormValue::Text(text) => text.trim().chars().count(),
        other => other.display().chars().count(),
    }
}

fn items(value: &FormValue) -> Option<Vec<&str>> {
    match value {
        FormValue::List(values) => Some(
            values
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .collect(),
        ),
        FormValue::Text(text) => Some(
            text.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .collect(),
        ),
        FormValue::Null => Some(Vec::new()),
        FormValue::Bool(_) | FormValue::Integer(_) | FormValue::Float(_) => None,
    }
}
