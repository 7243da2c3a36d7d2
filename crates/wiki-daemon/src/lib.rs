//! Wiki daemon library
//!
//! This module provides the core components for the wiki daemon:
//! - Page action handlers and path dispatch
//! - Storage backends
//! - HTML rendering
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod server;
pub mod storage;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, RenderError, StorageError};
pub use render::{HtmlRenderer, RenderMode, Renderer};
pub use server::Server;
pub use storage::{InMemoryStorage, PageStorage, Storage};
