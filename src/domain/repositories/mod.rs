//! Port definitions for the domain layer.
//!
//! Traits here define the contracts the application services depend on;
//! concrete implementations live in [`crate::infrastructure`]. Mocks are
//! auto-generated via `mockall` for unit tests.
//!
//! - [`LinkRepository`] - link records and the per-user slug index
//! - [`AccountDirectory`] - the hosted identity provider

pub mod account_directory;
pub mod link_repository;

pub use account_directory::{AccountDirectory, AccountHandle, AuthError};
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use account_directory::MockAccountDirectory;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
