use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::{
    domain::{DocumentId, Role, UserId},
    ordering::{DocumentOrdering, OrderingField, SortDirection},
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// A document as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub document_id: DocumentId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub role: Role,
    pub member_count: u32,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // Every connection to `sqlite::memory:` opens its own database.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_user(&self, username: &str) -> Result<UserId> {
        let rec = sqlx::query(
            "INSERT INTO users (username) VALUES (?)
             ON CONFLICT(username) DO UPDATE SET username=excluded.username
             RETURNING id",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(UserId(rec.get::<i64, _>(0)))
    }

    pub async fn username_for_user(&self, user_id: UserId) -> Result<Option<String>> {
        let row = sqlx::query("SELECT username FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn user_exists(&self, user_id: UserId) -> Result<bool> {
        Ok(self.username_for_user(user_id).await?.is_some())
    }

    /// Creates a document stamped with the current time; `owner` gets the owner access.
    pub async fn create_document(&self, owner: UserId, title: &str) -> Result<DocumentId> {
        let now = Utc::now();
        self.insert_document(owner, title, now, now).await
    }

    pub async fn insert_document(
        &self,
        owner: UserId,
        title: &str,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<DocumentId> {
        let document_id = DocumentId::new();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO documents (id, title, title_key, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(document_id.to_string())
        .bind(title)
        .bind(title_sort_key(title))
        .bind(encode_timestamp(created_at))
        .bind(encode_timestamp(updated_at))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to insert document '{title}'"))?;
        sqlx::query("INSERT INTO document_accesses (document_id, user_id, role) VALUES (?, ?, ?)")
            .bind(document_id.to_string())
            .bind(owner.0)
            .bind(Role::Owner.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to grant owner access to user {}", owner.0))?;
        tx.commit().await?;
        debug!(%document_id, owner = owner.0, "document created");
        Ok(document_id)
    }

    /// Grants `role` on a document, replacing any existing access of that user.
    pub async fn grant_access(
        &self,
        document_id: DocumentId,
        user_id: UserId,
        role: Role,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO document_accesses (document_id, user_id, role) VALUES (?, ?, ?)
             ON CONFLICT(document_id, user_id) DO UPDATE SET role=excluded.role",
        )
        .bind(document_id.to_string())
        .bind(user_id.0)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to grant {role} on {document_id} to {}", user_id.0))?;
        Ok(())
    }

    pub async fn count_documents_for_user(&self, user_id: UserId) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_accesses WHERE user_id = ?")
                .bind(user_id.0)
                .fetch_one(&self.pool)
                .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Lists the documents `user_id` has an access on, in `ordering` order
    /// (newest first when unordered).
    pub async fn list_documents_for_user(
        &self,
        user_id: UserId,
        ordering: Option<DocumentOrdering>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<StoredDocument>> {
        let sql = format!(
            "SELECT d.id, d.title, d.created_at, d.updated_at, a.role,
                    (SELECT COUNT(*) FROM document_accesses m WHERE m.document_id = d.id)
                        AS member_count
             FROM documents d
             JOIN document_accesses a ON a.document_id = d.id AND a.user_id = ?
             ORDER BY {}
             LIMIT ? OFFSET ?",
            order_by_clause(ordering)
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.0)
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).context("listing offset out of range")?)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(document_from_row).collect()
    }
}

fn order_by_clause(ordering: Option<DocumentOrdering>) -> &'static str {
    let Some(ordering) = ordering else {
        return "d.created_at DESC, d.id DESC";
    };
    match (ordering.field, ordering.direction) {
        (OrderingField::Title, SortDirection::Ascending) => "d.title_key ASC, d.id ASC",
        (OrderingField::Title, SortDirection::Descending) => "d.title_key DESC, d.id DESC",
        (OrderingField::CreatedAt, SortDirection::Ascending) => "d.created_at ASC, d.id ASC",
        (OrderingField::CreatedAt, SortDirection::Descending) => "d.created_at DESC, d.id DESC",
        (OrderingField::UpdatedAt, SortDirection::Ascending) => "d.updated_at ASC, d.id ASC",
        (OrderingField::UpdatedAt, SortDirection::Descending) => "d.updated_at DESC, d.id DESC",
    }
}

fn document_from_row(row: &SqliteRow) -> Result<StoredDocument> {
    let raw_id: String = row.try_get("id")?;
    let document_id = raw_id
        .parse::<DocumentId>()
        .with_context(|| format!("corrupt document id '{raw_id}'"))?;
    let raw_role: String = row.try_get("role")?;
    let role = raw_role
        .parse::<Role>()
        .map_err(|err| anyhow!("corrupt access row for document {document_id}: {err}"))?;
    let member_count: i64 = row.try_get("member_count")?;
    Ok(StoredDocument {
        document_id,
        title: row.try_get("title")?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: decode_timestamp(&row.try_get::<String, _>("updated_at")?)?,
        role,
        member_count: u32::try_from(member_count).unwrap_or(u32::MAX),
    })
}

/// Unicode-aware case folding; SQLite's `NOCASE` only folds ASCII.
fn title_sort_key(title: &str) -> String {
    title.to_lowercase()
}

fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .with_context(|| format!("corrupt timestamp '{raw}'"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
