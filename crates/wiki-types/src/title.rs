//! Page titles
//!
//! A [`Title`] is one or more ASCII alphanumerics. It is the only key clients
//! use to address a page, so it can only be built through [`Title::parse`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a string is not a valid title
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("title is empty")]
    Empty,

    #[error("invalid character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },
}

/// Validated page title
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Validate `raw` against `[A-Za-z0-9]+`
    pub fn parse(raw: &str) -> Result<Self, TitleError> {
        if raw.is_empty() {
            return Err(TitleError::Empty);
        }

        if let Some((position, ch)) = raw
            .char_indices()
            .find(|(_, ch)| !ch.is_ascii_alphanumeric())
        {
            return Err(TitleError::InvalidCharacter { ch, position });
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Title {
    type Err = TitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Title {
    type Error = TitleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Title> for String {
    fn from(title: Title) -> Self {
        title.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
