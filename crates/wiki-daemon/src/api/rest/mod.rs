//! REST surface: page actions plus health endpoints

mod form;
pub mod handlers;
pub mod router;
pub mod state;
