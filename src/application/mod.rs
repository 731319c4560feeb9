//! Application layer orchestrating domain operations.
//!
//! - [`services::resolver_service::ResolverService`] - the slug resolution
//!   pipeline (validation, password gate, decryption, click recording)
//! - [`services::link_service::LinkService`] - link creation, listing, and
//!   deletion

pub mod services;
