//! Form orchestration: validate a submission, then delegate the write.
//!
//! The service never touches the repository when validation fails. Both
//! validation rejections and repository refusals come back as `Ok(false)`;
//! only collaborator failures travel as `Err`.

use form_service_domain::{FieldErrors, FormInput, ValidationOutcome};
use form_service_ports::{LogEvent, LogFields, LogLevel, LoggerPort, RepositoryPort, ValidatorPort};
use form_service_shared::{ErrorEnvelope, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Dependencies required by the form service.
#[derive(Clone)]
pub struct FormServiceDeps {
    /// Validator applied before every write.
    pub validator: Arc<dyn ValidatorPort>,
    /// Repository performing create/update writes.
    pub repository: Arc<dyn RepositoryPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// How the most recent submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    /// Validation failed; the repository was not called.
    Rejected,
    /// The repository accepted the write.
    Persisted,
    /// Validation passed but the repository declined the write.
    NotPersisted,
}

impl FormOutcome {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Persisted => "persisted",
            Self::NotPersisted => "not_persisted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Save,
    Update,
}

impl Operation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Update => "update",
        }
    }

    fn delegate(self, repository: &dyn RepositoryPort, input: &FormInput) -> Result<bool> {
        match self {
            Self::Save => repository.create(input),
            Self::Update => repository.update(input),
        }
    }
}

/// Request-scoped form orchestrator.
///
/// Holds the field errors of the most recent validation attempt. Construct
/// one per submission; the collaborators are shared `Arc`s.
pub struct FormService {
    deps: FormServiceDeps,
    errors: FieldErrors,
    last_outcome: Option<FormOutcome>,
}

impl FormService {
    /// Create a service with empty error state.
    #[must_use]
    pub fn new(deps: FormServiceDeps) -> Self {
        Self {
            deps,
            errors: FieldErrors::new(),
            last_outcome: None,
        }
    }

    /// Validate `input` and create a record from it.
    ///
    /// Returns `Ok(false)` when validation fails (see [`Self::errors`]) or the
    /// repository declines the write.
    #[tracing::instrument(name = "forms.save", skip_all, fields(field_count = input.len()))]
    pub fn save(&mut self, input: &FormInput) -> Result<bool> {
        self.submit(Operation::Save, input)
    }

    /// Validate `input` and update the record it identifies.
    ///
    /// Same contract as [`Self::save`], delegating to `RepositoryPort::update`.
    #[tracing::instrument(name = "forms.update", skip_all, fields(field_count = input.len()))]
    pub fn update(&mut self, input: &FormInput) -> Result<bool> {
        self.submit(Operation::Update, input)
    }

    /// Field errors from the most recent validation attempt.
    ///
    /// Empty before the first call and after any attempt whose validation
    /// passed, including ones the repository then declined.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Outcome of the most recent call, `None` before the first call or after
    /// a collaborator error.
    #[must_use]
    pub const fn last_outcome(&self) -> Option<FormOutcome> {
        self.last_outcome
    }

    fn submit(&mut self, operation: Operation, input: &FormInput) -> Result<bool> {
        let started_at = Instant::now();
        self.last_outcome = None;

        let validation: ValidationOutcome = self.deps.validator.validate(input);
        if !validation.is_passed() {
            self.errors = validation.into_errors();
            self.last_outcome = Some(FormOutcome::Rejected);
            tracing::debug!(
                operation = operation.as_str(),
                invalid_fields = self.errors.len(),
                "submission rejected"
            );
            self.log(
                LogLevel::Info,
                operation,
                FormOutcome::Rejected.as_str(),
                "Form submission rejected by validation",
                self.rejected_fields(input, started_at),
                None,
            );
            return Ok(false);
        }

        self.errors = FieldErrors::new();
        match operation.delegate(self.deps.repository.as_ref(), input) {
            Ok(true) => {
                self.last_outcome = Some(FormOutcome::Persisted);
                self.log(
                    LogLevel::Info,
                    operation,
                    "completed",
                    "Form submission persisted",
                    base_fields(input, started_at),
                    None,
                );
                Ok(true)
            },
            Ok(false) => {
                self.last_outcome = Some(FormOutcome::NotPersisted);
                self.log(
                    LogLevel::Warn,
                    operation,
                    FormOutcome::NotPersisted.as_str(),
                    "Repository declined the form submission",
                    base_fields(input, started_at),
                    None,
                );
                Ok(false)
            },
            Err(error) => {
                self.log(
                    LogLevel::Error,
                    operation,
                    "failed",
                    "Form submission failed",
                    base_fields(input, started_at),
                    Some(&error),
                );
                Err(error)
            },
        }
    }

    fn rejected_fields(&self, input: &FormInput, started_at: Instant) -> LogFields {
        let mut fields = base_fields(input, started_at);
        let invalid: Vec<Value> = self
            .errors
            .iter()
            .map(|(field, _)| Value::from(field))
            .collect();
        fields.insert("invalidFields".into(), Value::Array(invalid));
        fields
    }

    fn log(
        &self,
        level: LogLevel,
        operation: Operation,
        suffix: &str,
        message: &str,
        mut fields: LogFields,
        error: Option<&ErrorEnvelope>,
    ) {
        let Some(logger) = self.deps.logger.as_ref() else {
            return;
        };
        fields.insert("operation".into(), Value::from(operation.as_str()));
        let event = format!("forms.{}.{suffix}", operation.as_str());
        logger.log(LogEvent {
            fields: Some(fields),
            error: error.and_then(|error| serde_json::to_value(error).ok()),
            ..LogEvent::new(level, &event, message)
        });
    }
}

// Field names only; submitted values never reach the log.
fn base_fields(input: &FormInput, started_at: Instant) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "fields".into(),
        Value::Array(input.field_names().map(Value::from).collect()),
    );
    fields.insert("durationMs".into(), Value::from(duration_ms(started_at)));
    fields
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}
