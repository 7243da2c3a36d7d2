//! In-memory storage implementation

use super::traits::*;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use wiki_types::{Page, PageId, Title};

#[derive(Debug, Default)]
struct Pages {
    records: HashMap<PageId, Page>,
    by_title: HashMap<Title, PageId>,
    next_id: i64,
}

impl Pages {
    fn issue_id(&mut self) -> PageId {
        self.next_id += 1;
        PageId::new(self.next_id)
    }
}

/// In-memory storage for development and testing
///
/// Records and the title index sit behind one lock so each save is applied
/// as a unit.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    pages: RwLock<Pages>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageStorage for InMemoryStorage {
    async fn load_page(&self, title: &Title) -> StorageResult<Option<Page>> {
        let pages = self.pages.read().await;
        Ok(pages
            .by_title
            .get(title)
            .and_then(|id| pages.records.get(id))
            .cloned())
    }

    async fn save_page(&self, mut page: Page) -> StorageResult<Page> {
        let mut pages = self.pages.write().await;

        let id = match SaveMode::of(&page) {
            SaveMode::Create => match pages.by_title.get(&page.title).copied() {
                Some(existing) => existing,
                None => {
                    let id = pages.issue_id();
                    pages.by_title.insert(page.title.clone(), id);
                    id
                }
            },
            SaveMode::Update(id) => {
                let stored = pages.records.get(&id).ok_or_else(|| unknown_id(id))?;
                if stored.title != page.title {
                    return Err(title_changed(id, stored.title.as_str(), &page.title));
                }
                id
            }
        };

        page.id = Some(id);
        pages.records.insert(id, page.clone());
        Ok(page)
    }

    async fn count_pages(&self) -> StorageResult<usize> {
        Ok(self.pages.read().await.records.len())
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::conformance::exercise_storage;

    fn title(s: &str) -> Title {
        Title::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_conformance() {
        exercise_storage(&InMemoryStorage::new(), "").await;
    }

    #[tokio::test]
    async fn test_load_missing_page() {
        let storage = InMemoryStorage::new();
        assert!(storage.load_page(&title("Nowhere")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let storage = InMemoryStorage::new();

        let saved = storage
            .save_page(Page::new(title("Welcome"), "Hello World"))
            .await
            .unwrap();
        assert!(saved.id.is_some());

        let loaded = storage.load_page(&title("Welcome")).await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.body, b"Hello World");
    }

    #[tokio::test]
    async fn test_identities_are_monotonic() {
        let storage = InMemoryStorage::new();
        let a = storage.save_page(Page::blank(title("A"))).await.unwrap();
        let b = storage.save_page(Page::blank(title("B"))).await.unwrap();
        assert!(b.id.unwrap() > a.id.unwrap());
    }

    #[tokio::test]
    async fn test_create_with_existing_title_updates_in_place() {
        let storage = InMemoryStorage::new();
        let first = storage
            .save_page(Page::new(title("Welcome"), "Hello World"))
            .await
            .unwrap();
        let second = storage
            .save_page(Page::new(title("Welcome"), "Updated"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(storage.count_pages().await.unwrap(), 1);
        let loaded = storage.load_page(&title("Welcome")).await.unwrap().unwrap();
        assert_eq!(loaded.body, b"Updated");
    }

    #[tokio::test]
    async fn test_update_by_identity() {
        let storage = InMemoryStorage::new();
        let mut page = storage
            .save_page(Page::new(title("Welcome"), "v1"))
            .await
            .unwrap();
        let id = page.id;

        page.body = b"v2".to_vec();
        let updated = storage.save_page(page).await.unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(storage.count_pages().await.unwrap(), 1);
        let loaded = storage.load_page(&title("Welcome")).await.unwrap().unwrap();
        assert_eq!(loaded.body, b"v2");
    }

    #[tokio::test]
    async fn test_update_cannot_change_title() {
        let storage = InMemoryStorage::new();
        let mut page = storage
            .save_page(Page::new(title("Welcome"), "v1"))
            .await
            .unwrap();
        storage
            .save_page(Page::new(title("Other"), "other"))
            .await
            .unwrap();

        page.title = title("Other");
        let err = storage.save_page(page.clone()).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        page.title = title("Renamed");
        let err = storage.save_page(page).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let original = storage.load_page(&title("Welcome")).await.unwrap().unwrap();
        assert_eq!(original.body, b"v1");
        assert!(storage.load_page(&title("Renamed")).await.unwrap().is_none());
        let other = storage.load_page(&title("Other")).await.unwrap().unwrap();
        assert_eq!(other.body, b"other");
    }

    #[tokio::test]
    async fn test_update_unknown_identity() {
        let storage = InMemoryStorage::new();
        let page = Page::blank(title("Ghost")).with_id(PageId::new(99));
        let err = storage.save_page(page).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert_eq!(storage.count_pages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let storage = InMemoryStorage::new();
        storage
            .save_page(Page::new(title("Welcome"), "x"))
            .await
            .unwrap();
        assert!(storage.load_page(&title("welcome")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identical_saves_are_idempotent() {
        let storage = InMemoryStorage::new();
        let first = storage
            .save_page(Page::new(title("Same"), "content"))
            .await
            .unwrap();
        let second = storage
            .save_page(Page::new(title("Same"), "content"))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(storage.count_pages().await.unwrap(), 1);
    }
}
