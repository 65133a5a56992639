//! Article command handlers.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{format_error_output, infra_exit_code, log_info};
use form_service_app::{FormOutcome, FormService};
use form_service_config::ValidatedFormServiceConfig;
use form_service_domain::{
    Article, ArticleDraft, ArticleId, FieldErrors, FormInput, article_id_from_input,
};
use form_service_infra::{
    ArticleFormMode, ArticleStore, InfraError, build_form_service_deps, build_logger,
    is_secret_key, open_article_store, redact_if_secret,
};
use form_service_shared::{ErrorCode, REDACTED};

/// Which write a submission is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOperation {
    Create,
    Update,
}

impl FormOperation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }

    const fn form_mode(self) -> ArticleFormMode {
        match self {
            Self::Create => ArticleFormMode::Create,
            Self::Update => ArticleFormMode::Update,
        }
    }
}

/// Run `article create` / `article update`.
///
/// Exit codes: 0 persisted, 2 rejected by validation, 4 refused by the
/// repository, 1 or 3 when a collaborator fails.
pub fn run_article_submit(
    mode: OutputMode,
    config: &ValidatedFormServiceConfig,
    operation: FormOperation,
    input: &FormInput,
) -> Result<CliOutput, CliError> {
    let logger = build_logger(&config.logging);
    let (deps, store) = match build_form_service_deps(config, operation.form_mode(), Some(logger))
    {
        Ok(built) => built,
        Err(error) => return Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    };

    let mut service = FormService::new(deps);
    let submitted = match operation {
        FormOperation::Create => service.save(input),
        FormOperation::Update => service.update(input),
    };
    let persisted = match submitted {
        Ok(persisted) => persisted,
        Err(error) => return Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    };

    tracing::debug!(
        operation = operation.as_str(),
        outcome = service.last_outcome().map(FormOutcome::as_str),
        "article submission handled"
    );

    if persisted {
        return match read_back(&store, operation, input) {
            Ok(article) => format_persisted(mode, operation, &article),
            Err(error) => Ok(format_error_output(mode, &error, infra_exit_code(&error))),
        };
    }

    match service.last_outcome() {
        Some(FormOutcome::Rejected) => format_rejected(mode, operation, input, service.errors()),
        _ => format_not_persisted(mode, operation),
    }
}

/// Run `article show`.
pub fn run_article_show(
    mode: OutputMode,
    config: &ValidatedFormServiceConfig,
    id: u64,
) -> Result<CliOutput, CliError> {
    match find_article(config, id) {
        Ok(article) => {
            let stdout = if mode.is_json() {
                let payload = serde_json::json!({
                    "status": "ok",
                    "article": article,
                });
                pretty_json(&payload)?
            } else {
                let mut out = String::from("status: ok\n");
                push_article_text(&mut out, &article);
                out
            };
            Ok(ok_output(mode, stdout, "article show completed"))
        },
        Err(error) => Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    }
}

/// Run `article list`.
pub fn run_article_list(
    mode: OutputMode,
    config: &ValidatedFormServiceConfig,
) -> Result<CliOutput, CliError> {
    let articles = match open_article_store(config).and_then(|store| store.lookup.list()) {
        Ok(articles) => articles,
        Err(error) => return Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    };

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "count": articles.len(),
            "articles": articles,
        });
        pretty_json(&payload)?
    } else {
        let mut out = format!("status: ok\ncount: {}\n", articles.len());
        for article in &articles {
            out.push_str(&format!("- {}: {}\n", article.id, article.title));
        }
        out
    };

    Ok(ok_output(mode, stdout, "article list completed"))
}

fn find_article(config: &ValidatedFormServiceConfig, id: u64) -> Result<Article, InfraError> {
    let id = ArticleId::new(id)?;
    let store = open_article_store(config)?;
    store.lookup.find(id)?.ok_or_else(|| {
        InfraError::expected(ErrorCode::not_found(), format!("article {id} not found"))
            .with_metadata("id", id.to_string())
    })
}

/// Re-read what a successful write stored.
///
/// A create reports no id, so the newest article matching the submitted draft
/// is taken. Another writer on the same database can only be confused with this
/// one if it stored an identical draft.
fn read_back(
    store: &ArticleStore,
    operation: FormOperation,
    input: &FormInput,
) -> Result<Article, InfraError> {
    let article = match operation {
        FormOperation::Create => {
            let draft = ArticleDraft::from_input(input)?;
            store.lookup.list()?.into_iter().rev().find(|article| {
                article.title == draft.title
                    && article.content == draft.content
                    && article.tags == draft.tags
            })
        },
        FormOperation::Update => store.lookup.find(article_id_from_input(input)?)?,
    };
    article.ok_or_else(|| {
        InfraError::invariant(
            ErrorCode::new("cli", "article_unreadable"),
            "persisted article could not be read back",
        )
    })
}

fn format_persisted(
    mode: OutputMode,
    operation: FormOperation,
    article: &Article,
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "operation": operation.as_str(),
            "article": article,
        });
        pretty_json(&payload)?
    } else {
        let mut out = format!("status: ok\noperation: {}\n", operation.as_str());
        push_article_text(&mut out, article);
        out
    };

    Ok(ok_output(mode, stdout, "article persisted"))
}

fn format_rejected(
    mode: OutputMode,
    operation: FormOperation,
    input: &FormInput,
    errors: &FieldErrors,
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_json() {
        let mut echoed = serde_json::Map::new();
        for (field, value) in input.iter() {
            let value = if is_secret_key(field) {
                serde_json::Value::String(REDACTED.to_string())
            } else {
                serde_json::to_value(value)?
            };
            echoed.insert(field.clone(), value);
        }
        let payload = serde_json::json!({
            "status": "rejected",
            "operation": operation.as_str(),
            "input": echoed,
            "errors": errors,
        });
        pretty_json(&payload)?
    } else {
        let mut out = format!("status: rejected\noperation: {}\ninput:\n", operation.as_str());
        for (field, value) in input.iter() {
            out.push_str(&format!(
                "  {field}: {}\n",
                redact_if_secret(field, &value.display())
            ));
        }
        out.push_str("errors:\n");
        for (field, messages) in errors.iter() {
            for message in messages {
                out.push_str(&format!("  {field}: {message}\n"));
            }
        }
        out
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "submission rejected", mode.no_progress);

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::InvalidInput,
    })
}

fn format_not_persisted(mode: OutputMode, operation: FormOperation) -> Result<CliOutput, CliError> {
    let message = "the repository did not persist the submission";
    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "not_persisted",
            "operation": operation.as_str(),
            "message": message,
        });
        pretty_json(&payload)?
    } else {
        format!(
            "status: not_persisted\noperation: {}\nmessage: {message}\n",
            operation.as_str()
        )
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "submission not persisted", mode.no_progress);

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::NotPersisted,
    })
}

fn push_article_text(out: &mut String, article: &Article) {
    let tags: Vec<&str> = article.tags.iter().map(|tag| tag.as_str()).collect();
    out.push_str(&format!("id: {}\n", article.id));
    out.push_str(&format!("title: {}\n", article.title));
    out.push_str(&format!("content: {}\n", article.content));
    out.push_str(&format!("tags: {}\n", tags.join(", ")));
}

fn ok_output(mode: OutputMode, stdout: String, progress: &str) -> CliOutput {
    let mut stderr = String::new();
    log_info(&mut stderr, progress, mode.no_progress);
    CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    }
}

fn pretty_json(payload: &serde_json::Value) -> Result<String, CliError> {
    let mut output = serde_json::to_string_pretty(payload)?;
    output.push('\n');
    Ok(output)
}
