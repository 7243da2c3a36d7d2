//! PostgreSQL storage implementation

use super::pool::PoolSettings;
use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row};
use wiki_types::{Page, PageId, Title};

/// PostgreSQL-backed storage
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connect to PostgreSQL and initialize schema
    pub async fn new(url: &str, settings: &PoolSettings) -> Result<Self, StorageError> {
        let pool = settings
            .options::<Postgres>()
            .connect(url)
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
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL UNIQUE,
                body BYTEA NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn page_from_row(row: &sqlx::postgres::PgRow) -> StorageResult<Page> {
        let id: i64 = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let body: Vec<u8> = row.try_get("body")?;
        let title = Title::parse(&title)
            .map_err(|e| StorageError::InvalidData(format!("stored title {title:?}: {e}")))?;

        Ok(Page::new(title, body).with_id(PageId::new(id)))
    }
}

#[async_trait]
impl PageStorage for PostgresStorage {
    async fn load_page(&self, title: &Title) -> StorageResult<Option<Page>> {
        let row = sqlx::query("SELECT id, title, body FROM pages WHERE title = $1")
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
                    VALUES ($1, $2, $3, $3)
                    ON CONFLICT (title) DO UPDATE SET
                        body = EXCLUDED.body,
                        updated_at = EXCLUDED.updated_at
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
                    "UPDATE pages SET body = $1, updated_at = $2 WHERE id = $3 AND title = $4",
                )
                .bind(&page.body)
                .bind(now)
                .bind(id.get())
                .bind(page.title.as_str())
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    let stored = sqlx::query("SELECT title FROM pages WHERE id = $1")
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
impl Storage for PostgresStorage {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
