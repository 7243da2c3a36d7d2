//! MySQL storage implementation

use super::pool::PoolSettings;
use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, Row};
use wiki_types::{Page, PageId, Title};

/// MySQL-backed storage
///
/// Titles use a binary ASCII collation so lookups and uniqueness are
/// case-sensitive, as on the other backends.
#[derive(Debug, Clone)]
pub struct MySqlStorage {
    pool: MySqlPool,
}

impl MySqlStorage {
    /// Connect to MySQL and initialize schema
    pub async fn new(url: &str, settings: &PoolSettings) -> Result<Self, StorageError> {
        let pool = settings
            .options::<MySql>()
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
                id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
                title VARCHAR(255) CHARACTER SET ascii COLLATE ascii_bin NOT NULL,
                body LONGBLOB NOT NULL,
                created_at DATETIME(6) NOT NULL,
                updated_at DATETIME(6) NOT NULL,
                UNIQUE KEY pages_title (title)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PageStorage for MySqlStorage {
    async fn load_page(&self, title: &Title) -> StorageResult<Option<Page>> {
        let row = sqlx::query("SELECT id, body FROM pages WHERE title = ?")
            .bind(title.as_str())
            .fetch_optional(&self.pool)
            .await?;

        // The match is exact, so the stored title is the requested one.
        row.map(|row| {
            let id: i64 = row.try_get("id")?;
            let body: Vec<u8> = row.try_get("body")?;
            Ok(Page::new(title.clone(), body).with_id(PageId::new(id)))
        })
        .transpose()
    }

    async fn save_page(&self, mut page: Page) -> StorageResult<Page> {
        let now = chrono::Utc::now();

        let id = match SaveMode::of(&page) {
            SaveMode::Create => {
                // LAST_INSERT_ID(id) makes the adopted row's id visible to the
                // client when the title already exists.
                let result = sqlx::query(
                    r#"
                    INSERT INTO pages (title, body, created_at, updated_at)
                    VALUES (?, ?, ?, ?)
                    ON DUPLICATE KEY UPDATE
                        id = LAST_INSERT_ID(id),
                        body = VALUES(body),
                        updated_at = VALUES(updated_at)
                    "#,
                )
                .bind(page.title.as_str())
                .bind(&page.body)
                .bind(now)
                .bind(now)
                .execute(&self.pool)
                .await?;

                let id = i64::try_from(result.last_insert_id())
                    .map_err(|e| StorageError::InvalidData(e.to_string()))?;
                PageId::new(id)
            }
            SaveMode::Update(id) => {
                let result = sqlx::query(
                    "UPDATE pages SET body = ?, updated_at = ? WHERE id = ? AND title = ?",
                )
                .bind(&page.body)
                .bind(now)
                .bind(id.get())
                .bind(page.title.as_str())
                .execute(&self.pool)
                .await?;

                // MySQL counts changed rows, not matched ones, so zero can also
                // mean the row already held these values.
                if result.rows_affected() == 0 {
                    let stored =
                        sqlx::query("SELECT CAST(title AS BINARY) AS title FROM pages WHERE id = ?")
                            .bind(id.get())
                            .fetch_optional(&self.pool)
                            .await?;
                    match stored {
                        None => return Err(unknown_id(id)),
                        Some(row) => {
                            let stored: Vec<u8> = row.try_get("title")?;
                            if stored != page.title.as_str().as_bytes() {
                                let stored = String::from_utf8_lossy(&stored);
                                return Err(title_changed(id, &stored, &page.title));
                            }
                        }
                    }
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
impl Storage for MySqlStorage {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
