//! Page rendering
//!
//! Handlers only see the [`Renderer`] trait; the daemon ships
//! [`HtmlRenderer`] as its implementation.

mod html;

pub use html::HtmlRenderer;

use crate::error::RenderError;
use std::fmt;
use wiki_types::Page;

/// Which view of a page to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    View,
    Edit,
}

impl RenderMode {
    pub fn template_name(self) -> &'static str {
        match self {
            RenderMode::View => "view.html",
            RenderMode::Edit => "edit.html",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::View => f.write_str("view"),
            RenderMode::Edit => f.write_str("edit"),
        }
    }
}

/// Turns a page into response bytes
pub trait Renderer: Send + Sync {
    fn render(&self, mode: RenderMode, page: &Page) -> Result<Vec<u8>, RenderError>;
}
