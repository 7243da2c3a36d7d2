//! The page entity

use crate::ids::PageId;
use crate::title::Title;
use serde::{Deserialize, Serialize};

/// A wiki page
///
/// `id` is `None` until the page has been saved once; storage backends are
/// the only place identities come from. `body` is opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: Option<PageId>,
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    /// Create an unsaved page
    pub fn new(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self {
            id: None,
            title,
            body: body.into(),
        }
    }

    /// Unsaved page with empty content, used as the starting point of an edit
    pub fn blank(title: Title) -> Self {
        Self::new(title, Vec::new())
    }

    pub fn with_id(mut self, id: PageId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
