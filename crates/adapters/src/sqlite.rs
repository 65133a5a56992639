//! SQLite-backed article repository.
//!
//! Each operation opens its own connection, so the repository is `Sync`
//! without holding a lock across calls. Writes and their tag sync share one
//! transaction.

use form_service_domain::{ArticleDraft, Tag, article_id_from_input};
use form_service_ports::{Article, ArticleId, ArticleLookupPort, FormInput, RepositoryPort};
use form_service_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::{Path, PathBuf};

const SCHEMA_VERSION: i64 = 1;

/// Article repository stored in a SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteArticleRepository {
    path: PathBuf,
}

impl SqliteArticleRepository {
    /// Open (and if needed create) the database at `path`.
    ///
    /// The schema is created eagerly so a bad path fails here rather than on
    /// the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let repository = Self { path: path.into() };
        repository.connect()?;
        Ok(repository)
    }

    /// Database file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        open_connection(&self.path)
    }
}

impl RepositoryPort for SqliteArticleRepository {
    fn create(&self, input: &FormInput) -> Result<bool> {
        let draft = ArticleDraft::from_input(input).map_err(ErrorEnvelope::from)?;
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|error| storage_error(&format!("sqlite begin failed: {error}")))?;

        tx.execute(
            "INSERT INTO articles (title, content) VALUES (?1, ?2)",
            (&draft.title, &draft.content),
        )
        .map_err(|error| storage_error(&format!("sqlite insert failed: {error}")))?;
        let article_id = tx.last_insert_rowid();
        sync_tags(&tx, article_id, &draft.tags)?;

        tx.commit()
            .map_err(|error| storage_error(&format!("sqlite commit failed: {error}")))?;
        tracing::debug!(article_id, "sqlite repository created article");
        Ok(true)
    }

    fn update(&self, input: &FormInput) -> Result<bool> {
        let id = article_id_from_input(input).map_err(ErrorEnvelope::from)?;
        let draft = ArticleDraft::from_input(input).map_err(ErrorEnvelope::from)?;
        let article_id = to_row_id(id)?;

        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|error| storage_error(&format!("sqlite begin failed: {error}")))?;

        let changed = tx
            .execute(
                "UPDATE articles SET title = ?1, content = ?2 WHERE id = ?3",
                (&draft.title, &draft.content, article_id),
            )
            .map_err(|error| storage_error(&format!("sqlite update failed: {error}")))?;
        if changed == 0 {
            tracing::debug!(article_id, "sqlite repository update of unknown article");
            return Ok(false);
        }

        sync_tags(&tx, article_id, &draft.tags)?;
        tx.commit()
            .map_err(|error| storage_error(&format!("sqlite commit failed: {error}")))?;
        Ok(true)
    }
}

impl ArticleLookupPort for SqliteArticleRepository {
    fn find(&self, id: ArticleId) -> Result<Option<Article>> {
        let conn = self.connect()?;
        let row: Option<ArticleRow> = conn
            .query_row(
                "SELECT id, title, content FROM articles WHERE id = ?1",
                [to_row_id(id)?],
                read_article_row,
            )
            .optional()
            .map_err(|error| storage_error(&format!("sqlite query failed: {error}")))?;

        row.map(|row| hydrate(&conn, row)).transpose()
    }

    fn list(&self) -> Result<Vec<Article>> {
        let conn = self.connect()?;
        let rows = query_articles(&conn, "SELECT id, title, content FROM articles ORDER BY id")?;
        rows.into_iter().map(|row| hydrate(&conn, row)).collect()
    }

    fn latest(&self) -> Result<Option<Article>> {
        let conn = self.connect()?;
        let rows = query_articles(
            &conn,
            "SELECT id, title, content FROM articles ORDER BY id DESC LIMIT 1",
        )?;
        rows.into_iter().next().map(|row| hydrate(&conn, row)).transpose()
    }
}

type ArticleRow = (i64, String, String);

fn read_article_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArticleRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn query_articles(conn: &Connection, sql: &str) -> Result<Vec<ArticleRow>> {
    let mut statement = conn
        .prepare(sql)
        .map_err(|error| storage_error(&format!("sqlite prepare failed: {error}")))?;
    let rows = statement
        .query_map([], read_article_row)
        .map_err(|error| storage_error(&format!("sqlite query failed: {error}")))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|error| storage_error(&format!("sqlite row decode failed: {error}")))
}

fn hydrate(conn: &Connection, (row_id, title, content): ArticleRow) -> Result<Article> {
    let id = u64::try_from(row_id)
        .ok()
        .and_then(|value| ArticleId::new(value).ok())
        .ok_or_else(|| {
            ErrorEnvelope::invariant(
                ErrorCode::new("repository", "invalid_row_id"),
                format!("stored article id {row_id} is not a valid id"),
            )
        })?;

    let mut statement = conn
        .prepare(
            "SELECT t.name FROM article_tags link
             JOIN tags t ON t.id = link.tag_id
             WHERE link.article_id = ?1
             ORDER BY link.position",
        )
        .map_err(|error| storage_error(&format!("sqlite prepare failed: {error}")))?;
    let names = statement
        .query_map([row_id], |row| row.get::<_, String>(0))
        .map_err(|error| storage_error(&format!("sqlite tag query failed: {error}")))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|error| storage_error(&format!("sqlite row decode failed: {error}")))?;
    let tags = names
        .iter()
        .map(|name| Tag::parse(name).map_err(ErrorEnvelope::from))
        .collect::<Result<Vec<_>>>()?;

    Ok(Article {
        id,
        title,
        content,
        tags,
    })
}

fn sync_tags(tx: &Transaction<'_>, article_id: i64, tags: &[Tag]) -> Result<()> {
    tx.execute("DELETE FROM article_tags WHERE article_id = ?1", [article_id])
        .map_err(|error| storage_error(&format!("sqlite tag detach failed: {error}")))?;

    for (position, tag) in (0_i64..).zip(tags) {
        tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", [tag.as_str()])
            .map_err(|error| storage_error(&format!("sqlite tag insert failed: {error}")))?;
        let tag_id: i64 = tx
            .query_row("SELECT id FROM tags WHERE name = ?1", [tag.as_str()], |row| {
                row.get(0)
            })
            .map_err(|error| storage_error(&format!("sqlite tag lookup failed: {error}")))?;
        tx.execute(
            "INSERT INTO article_tags (article_id, tag_id, position) VALUES (?1, ?2, ?3)",
            (article_id, tag_id, position),
        )
        .map_err(|error| storage_error(&format!("sqlite tag attach failed: {error}")))?;
    }

    Ok(())
}

fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|error| storage_error(&format!("sqlite mkdir failed: {error}")))?;
    }

    let conn = Connection::open(path)
        .map_err(|error| storage_error(&format!("sqlite open failed: {error}")))?;
    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
        .map_err(|error| storage_error(&format!("sqlite pragma failed: {error}")))?;

    let version: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|error| storage_error(&format!("sqlite version failed: {error}")))?;

    if version == 0 {
        init_sqlite_schema(&conn)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|error| storage_error(&format!("sqlite version set failed: {error}")))?;
        return Ok(conn);
    }

    if version != SCHEMA_VERSION {
        return Err(ErrorEnvelope::expected(
            ErrorCode::new("repository", "schema_version_mismatch"),
            format!(
                "database schema version {version} is not supported (expected {SCHEMA_VERSION})"
            ),
        )
        .with_metadata("path", path.to_string_lossy().to_string()));
    }

    Ok(conn)
}

fn init_sqlite_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
         );
         CREATE TABLE IF NOT EXISTS article_tags (
            article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id),
            position INTEGER NOT NULL,
            PRIMARY KEY (article_id, tag_id)
         );",
    )
    .map_err(|error| storage_error(&format!("sqlite schema failed: {error}")))?;
    Ok(())
}

fn to_row_id(id: ArticleId) -> Result<i64> {
    i64::try_from(id.get()).map_err(|_| {
        ErrorEnvelope::expected(
            ErrorCode::new("repository", "id_out_of_range"),
            format!("article id {id} exceeds the storage range"),
        )
    })
}

fn storage_error(message: &str) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("repository", "sqlite"),
        message.to_string(),
        ErrorClass::NonRetriable,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn temp_db() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("form-service-sqlite-unit-{}-{n}", std::process::id()))
            .join("articles.db")
    }

    #[test]
    fn create_then_find_round_trips_tags() -> Result<()> {
        let path = temp_db();
        let repository = SqliteArticleRepository::open(&path)?;

        assert!(repository.create(
            &FormInput::new()
                .with("title", "Hello")
                .with("content", "Body")
                .with("tags", "Rust, Web Dev, rust")
        )?);

        let article = repository
            .latest()?
            .ok_or_else(|| storage_error("missing article"))?;
        assert_eq!(article.id.get(), 1);
        assert_eq!(article.content, "Body");
        let tags: Vec<&str> = article.tags.iter().map(Tag::as_str).collect();
        assert_eq!(tags, vec!["rust", "web-dev"]);

        let _ = std::fs::remove_dir_all(path.parent().unwrap_or(&path));
        Ok(())
    }

    #[test]
    fn unknown_update_leaves_database_untouched() -> Result<()> {
        let path = temp_db();
        let repository = SqliteArticleRepository::open(&path)?;

        let updated = repository.update(&FormInput::new().with("id", 999_i64).with("title", "X"))?;
        assert!(!updated);
        assert!(repository.list()?.is_empty());

        let _ = std::fs::remove_dir_all(path.parent().unwrap_or(&path));
        Ok(())
    }

    #[test]
    fn rejects_foreign_schema_version() -> Result<()> {
        let path = temp_db();
        SqliteArticleRepository::open(&path)?;
        let conn = Connection::open(&path)
            .map_err(|error| storage_error(&error.to_string()))?;
        conn.pragma_update(None, "user_version", 7_i64)
            .map_err(|error| storage_error(&error.to_string()))?;
        drop(conn);

        let result = SqliteArticleRepository::open(&path);
        assert!(matches!(result, Err(error) if error.code.code() == "schema_version_mismatch"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap_or(&path));
        Ok(())
    }
}
