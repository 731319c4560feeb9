//! HTTP request handlers.

pub mod health;
pub mod links;
pub mod resolve;

pub use health::health_handler;
pub use links::{create_link_handler, delete_link_handler, list_links_handler};
pub use resolve::{resolve_handler, unlock_handler};
