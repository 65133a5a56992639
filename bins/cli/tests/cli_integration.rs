//! CLI integration tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    fn new(label: &str) -> std::io::Result<Self> {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "form-service-cli-{label}-{}-{unique}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn db_path(&self) -> PathBuf {
        self.dir.join("articles.db")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_forms"));
        command.args(args);
        scrub_scoped_env(&mut command);
        command
            .env("FORMS_STORAGE_PROVIDER", "sqlite")
            .env("FORMS_STORAGE_PATH", self.db_path())
            .env("FORMS_LOG_LEVEL", "error");
        command
    }

    fn run(&self, args: &[&str]) -> std::io::Result<Output> {
        self.command(args).output()
    }

    fn run_with_stdin(&self, args: &[&str], stdin: &str) -> std::io::Result<Output> {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(stdin.as_bytes())?;
        }
        child.wait_with_output()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn scrub_scoped_env(command: &mut Command) {
    for (key, _) in std::env::vars() {
        if key.starts_with("FORMS_") {
            command.env_remove(key);
        }
    }
    command.env_remove("RUST_LOG");
}

fn stdout_json(output: &Output) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_slice(&output.stdout)
}

fn fixture_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/config/tests/fixtures")
        .join(relative)
}

#[test]
fn create_persists_and_prints_the_article() -> TestResult {
    let workspace = Workspace::new("create")?;
    let output = workspace.run(&[
        "--output",
        "json",
        "article",
        "create",
        "--input",
        r#"{"title": "Hello", "content": "First post", "tags": ["rust", "forms"]}"#,
    ])?;

    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output)?;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["operation"], "create");
    assert_eq!(value["article"]["id"], 1);
    assert_eq!(value["article"]["title"], "Hello");
    assert_eq!(value["article"]["tags"], serde_json::json!(["rust", "forms"]));
    Ok(())
}

#[test]
fn rejected_submission_exits_2_and_writes_nothing() -> TestResult {
    let workspace = Workspace::new("rejected")?;
    let output = workspace.run(&[
        "--output",
        "json",
        "article",
        "create",
        "--input",
        r#"{"title": "", "content": "Body"}"#,
    ])?;

    assert_eq!(output.status.code(), Some(2));
    let value = stdout_json(&output)?;
    assert_eq!(value["status"], "rejected");
    assert_eq!(value["input"]["content"], "Body");
    assert_eq!(value["errors"]["title"][0], "title is required");

    let listed = workspace.run(&["--output", "json", "article", "list"])?;
    assert_eq!(listed.status.code(), Some(0));
    assert_eq!(stdout_json(&listed)?["count"], 0);
    Ok(())
}

#[test]
fn rejected_submission_text_lists_field_errors() -> TestResult {
    let workspace = Workspace::new("rejected-text")?;
    let output = workspace.run(&["article", "create", "--input", r#"{"content": "Body"}"#])?;

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("status: rejected\n"));
    assert!(stdout.contains("  content: Body\n"));
    assert!(stdout.contains("  title: title is required\n"));
    Ok(())
}

#[test]
fn update_of_unknown_article_exits_4() -> TestResult {
    let workspace = Workspace::new("refused")?;
    let output = workspace.run(&[
        "--output",
        "json",
        "article",
        "update",
        "--input",
        r#"{"id": 999, "title": "Ghost", "content": "Nobody home"}"#,
    ])?;

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(stdout_json(&output)?["status"], "not_persisted");
    Ok(())
}

#[test]
fn update_rewrites_an_existing_article() -> TestResult {
    let workspace = Workspace::new("update")?;
    let created = workspace.run(&[
        "article",
        "create",
        "--input",
        r#"{"title": "Draft", "content": "v1", "tags": "a, b"}"#,
    ])?;
    assert_eq!(created.status.code(), Some(0));

    let updated = workspace.run(&[
        "--output",
        "json",
        "article",
        "update",
        "--input",
        r#"{"id": 1, "title": "Final", "content": "v2", "tags": ["b"]}"#,
    ])?;
    assert_eq!(updated.status.code(), Some(0));
    assert_eq!(stdout_json(&updated)?["article"]["title"], "Final");

    let shown = workspace.run(&["--output", "json", "article", "show", "--id", "1"])?;
    assert_eq!(shown.status.code(), Some(0));
    let value = stdout_json(&shown)?;
    assert_eq!(value["article"]["content"], "v2");
    assert_eq!(value["article"]["tags"], serde_json::json!(["b"]));
    Ok(())
}

#[test]
fn update_without_id_is_rejected() -> TestResult {
    let workspace = Workspace::new("update-no-id")?;
    let output = workspace.run(&[
        "--output",
        "json",
        "article",
        "update",
        "--input",
        r#"{"title": "No id", "content": "Body"}"#,
    ])?;

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_json(&output)?["errors"]["id"][0], "id is required");
    Ok(())
}

#[test]
fn create_reads_submission_from_stdin() -> TestResult {
    let workspace = Workspace::new("stdin")?;
    let output = workspace.run_with_stdin(
        &["--output", "json", "article", "create", "--stdin"],
        r#"{"title": "Piped", "content": "From stdin"}"#,
    )?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)?["article"]["title"], "Piped");
    Ok(())
}

#[test]
fn malformed_input_is_reported_as_invalid() -> TestResult {
    let workspace = Workspace::new("malformed")?;
    let output = workspace.run(&["--output", "json", "article", "create", "--input", "[1, 2]"])?;

    assert_eq!(output.status.code(), Some(2));
    let value = stdout_json(&output)?;
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["code"]["code"], "invalid_form_json");
    Ok(())
}

#[test]
fn missing_input_flag_exits_2() -> TestResult {
    let workspace = Workspace::new("missing-input")?;
    let output = workspace.run(&["article", "create"])?;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("missing --input or --stdin"));
    Ok(())
}

#[test]
fn show_of_unknown_article_exits_2() -> TestResult {
    let workspace = Workspace::new("show-missing")?;
    let output = workspace.run(&["--output", "json", "article", "show", "--id", "42"])?;

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_json(&output)?["error"]["code"]["code"], "not_found");
    Ok(())
}

#[test]
fn config_show_reflects_env_overrides() -> TestResult {
    let workspace = Workspace::new("config-show")?;
    let output = workspace.run(&["--output", "json", "config", "show"])?;

    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output)?;
    assert_eq!(value["effectiveConfig"]["storage"]["provider"], "sqlite");
    assert_eq!(value["effectiveConfig"]["logging"]["level"], "error");
    Ok(())
}

#[test]
fn config_show_reads_a_config_file() -> TestResult {
    let workspace = Workspace::new("config-file")?;
    let fixture = fixture_path("forms.valid.json");
    let fixture = fixture.to_string_lossy();
    let output = workspace
        .command(&["--output", "json", "--config", &fixture, "config", "show"])
        .env_remove("FORMS_LOG_LEVEL")
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output)?;
    assert_eq!(value["effectiveConfig"]["article"]["titleMaxChars"], 120);
    Ok(())
}

#[test]
fn missing_config_file_exits_2() -> TestResult {
    let workspace = Workspace::new("config-missing")?;
    let missing = workspace.dir.join("absent.toml");
    let missing = missing.to_string_lossy();
    let output = workspace.run(&["--output", "json", "--config", &missing, "config", "show"])?;

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stdout_json(&output)?["error"]["code"]["code"],
        "config_file_not_found"
    );
    Ok(())
}

#[test]
fn config_schema_is_json() -> TestResult {
    let workspace = Workspace::new("schema")?;
    let output = workspace.run(&["config", "schema"])?;

    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output)?;
    assert!(value.get("properties").is_some());
    Ok(())
}
