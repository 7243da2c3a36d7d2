//! Strongly-typed identifiers for stored pages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identity of a page record
///
/// Issued by the storage backend on first save and never reassigned. Any
/// value is a legitimate key, zero included; absence is expressed with
/// `Option<PageId>` on [`crate::Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(i64);

impl PageId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for PageId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page:{}", self.0)
    }
}
