//! Request path grammar
//!
//! The only paths the editor serves are `/<action>/<title>`:
//!
//! ```text
//! path   = "/" action "/" title
//! action = "view" | "edit" | "save"
//! title  = 1*( ALPHA / DIGIT )
//! ```
//!
//! [`PagePath::parse`] checks that shape segment by segment. It is total,
//! pure, and never consults storage.

use crate::title::{Title, TitleError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Action a client requests for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Edit,
    Save,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::View, Action::Edit, Action::Save];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Edit => "edit",
            Action::Save => "save",
        }
    }

    /// Path for this action applied to `title`
    pub fn path_for(self, title: &Title) -> String {
        format!("/{}/{}", self.as_str(), title)
    }
}

impl FromStr for Action {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Action::View),
            "edit" => Ok(Action::Edit),
            "save" => Ok(Action::Save),
            other => Err(PathError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a path was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path must start with '/'")]
    MissingLeadingSlash,

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("missing page title")]
    MissingTitle,

    #[error("unexpected path segments after title")]
    ExtraSegments,

    #[error("invalid title: {0}")]
    InvalidTitle(#[from] TitleError),
}

/// A validated `/<action>/<title>` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath {
    pub action: Action,
    pub title: Title,
}

impl PagePath {
    pub fn new(action: Action, title: Title) -> Self {
        Self { action, title }
    }

    /// Decode a raw URL path into an action and title
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let rest = path
            .strip_prefix('/')
            .ok_or(PathError::MissingLeadingSlash)?;

        let mut segments = rest.splitn(3, '/');
        let action: Action = segments.next().unwrap_or_default().parse()?;
        let title = segments.next().ok_or(PathError::MissingTitle)?;
        if segments.next().is_some() {
            return Err(PathError::ExtraSegments);
        }

        let title = match Title::parse(title) {
            Ok(title) => title,
            Err(TitleError::Empty) => return Err(PathError::MissingTitle),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { action, title })
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.action.path_for(&self.title))
    }
}
