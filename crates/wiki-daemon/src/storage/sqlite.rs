//! SQLite storage implementation

use super::pool::PoolSettings;
use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use sqlx::{
    sqlite::SqliteConnectOptions,
    Row, Sqlite, SqlitePool,
};
use std::str::FromStr;
use wiki_types::{Page, PageId, Title};

/// SQLite-backed storage
///
/// Accepts file URLs (`sqlite://wiki.db`, created if missing) and
/// `sqlite::memory:`. With [`PoolSettings::new`] connections are never
/// recycled, so an in-memory database lives as long as the storage when
/// `max_connections` is 1.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open the database and initialize schema
    pub async fn new(url: &str, settings: &PoolSettings) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .create_if_missing(true);

        let pool = settings
            .options::<Sqlite>()
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let storage = Self { pool };
        storage.initialize_schema().await?;
        Ok(storage)
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                body BLOB NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn page_from_row(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Page> {
        let id: i64 = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let body: Vec<u8> = row.try_get("body")?;
        let title = Title::parse(&title)
            .map_err(|e| StorageError::InvalidData(format!("stored title {title:?}: {e}")))?;

        Ok(Page::new(title, body).with_id(PageId::new(id)))
    }
}

#[async_trait]
impl PageStorage for SqliteStorage {
    async fn load_page(&self, title: &Title) -> StorageResult<Option<Page>> {
        let row = sqlx::query("SELECT id, title, body FROM pages WHERE title = ?1")
            .bind(title.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::page_from_row).transpose()
    }

    async fn save_page(&self, mut page: Page) -> StorageResult<Page> {
        let now = chrono::Utc::now();

        let id = match SaveMode::of(&page) {
            SaveMode::Create => {
                let row = sqlx::query(
                    r#"
                    INSERT INTO pages (title, body, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?3)
                    ON CONFLICT (title) DO UPDATE SET
                        body = excluded.body,
                        updated_at = excluded.updated_at
                    RETURNING id
                    "#,
                )
                .bind(page.title.as_str())
                .bind(&page.body)
                .bind(now)
                .fetch_one(&self.pool)
                .await?;

                PageId::new(row.try_get("id")?)
            }
            SaveMode::Update(id) => {
                let result = sqlx::query(
                    "UPDATE pages SET body = ?1, updated_at = ?2 WHERE id = ?3 AND title = ?4",
                )
                .bind(&page.body)
                .bind(now)
                .bind(id.get())
                .bind(page.title.as_str())
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    let stored = sqlx::query("SELECT title FROM pages WHERE id = ?1")
                        .bind(id.get())
                        .fetch_optional(&self.pool)
                        .await?;
                    return Err(match stored {
                        Some(row) => {
                            let stored: String = row.try_get("title")?;
                            title_changed(id, &stored, &page.title)
                        }
                        None => unknown_id(id),
                    });
                }

                id
            }
        };

        tracing::debug!(page_id = %id, title = %page.title, "Saved page row");
        page.id = Some(id);
        Ok(page)
    }

    async fn count_pages(&self) -> StorageResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages")
            .fetch_one(&self.pool)
            .await?;

        usize::try_from(count).map_err(|e| StorageError::InvalidData(e.to_string()))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
