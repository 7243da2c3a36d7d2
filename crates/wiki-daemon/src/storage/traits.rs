//! Storage trait definitions

use crate::error::StorageError;
use async_trait::async_trait;
use wiki_types::{Page, PageId, Title};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// How a save is applied, decided from the page's identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Never saved: insert keyed on title, adopting the existing row if the
    /// title is already stored
    Create,

    /// Already saved: update the row with this identity in place
    Update(PageId),
}

impl SaveMode {
    pub fn of(page: &Page) -> Self {
        match page.id {
            None => SaveMode::Create,
            Some(id) => SaveMode::Update(id),
        }
    }
}

/// Combined storage trait
#[async_trait]
pub trait Storage: PageStorage + Send + Sync {
    /// Short backend name for logs and status output
    fn backend(&self) -> &'static str;

    /// Check that the backend is reachable
    async fn ping(&self) -> StorageResult<()>;
}

/// Storage for wiki pages
#[async_trait]
pub trait PageStorage: Send + Sync {
    /// Get the page whose title matches exactly
    async fn load_page(&self, title: &Title) -> StorageResult<Option<Page>>;

    /// Insert or update a page, returning it with its identity set.
    ///
    /// Updates never change a record's title: an `Update` whose title differs
    /// from the stored one fails with [`StorageError::Conflict`], and one whose
    /// identity is unknown fails with [`StorageError::NotFound`].
    async fn save_page(&self, page: Page) -> StorageResult<Page>;

    /// Number of stored pages
    async fn count_pages(&self) -> StorageResult<usize>;
}

/// Error for an `Update` whose title does not match the stored record
pub(crate) fn title_changed(id: PageId, stored: &str, requested: &Title) -> StorageError {
    StorageError::Conflict(format!(
        "{id} is titled {stored:?}; cannot save it as {requested:?}"
    ))
}

/// Error for an `Update` against an identity that was never issued
pub(crate) fn unknown_id(id: PageId) -> StorageError {
    StorageError::NotFound(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_mode_follows_identity() {
        let page = Page::blank(Title::parse("Welcome").unwrap());
        assert_eq!(SaveMode::of(&page), SaveMode::Create);

        let page = page.with_id(PageId::new(0));
        assert_eq!(SaveMode::of(&page), SaveMode::Update(PageId::new(0)));
    }
}
