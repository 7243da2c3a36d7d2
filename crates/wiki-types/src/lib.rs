//! Wiki Types - Core types for the page editor
//!
//! ## Key Concepts
//!
//! - **Page**: a titled body of content, optionally carrying a store-assigned identity
//! - **Title**: the validated external lookup key (`[A-Za-z0-9]+`)
//! - **PagePath**: a request path decoded into an [`Action`] and a [`Title`]

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod ids;
pub mod page;
pub mod path;
pub mod title;

pub use ids::PageId;
pub use page::Page;
pub use path::{Action, PagePath, PathError};
pub use title::{Title, TitleError};
