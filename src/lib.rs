//! # linkvault
//!
//! A privacy-focused URL shortener core: destinations are stored encrypted
//! under per-owner derived keys, and resolution runs through a guarded
//! pipeline (existence, expiry, click quota, optional password gate) before
//! the destination is decrypted and the click recorded.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer
//! separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities and the ports to the two
//!   external collaborators (document store, account directory)
//! - **Application Layer** ([`application`]) - The resolution pipeline and
//!   link management services
//! - **Crypto** ([`crypto`]) - Key derivation and the authenticated payload
//!   codec
//! - **Infrastructure Layer** ([`infrastructure`]) - REST and in-memory
//!   implementations of the store and directory
//! - **API Layer** ([`api`]) - Axum handlers, DTOs, and middleware
//!
//! ## Resolution Pipeline
//!
//! `GET /go?slug=...` walks load → validate (expiry, quota) → gate
//! (password) → decrypt → record-click → redirect. A failed decrypt never
//! consumes a click; a failed click write never withholds the destination.
//!
//! ## Quick Start
//!
//! ```bash
//! # Required environment variables
//! export STORE_URL="https://your-project.firebaseio.example"
//! export LINK_KEY_SECRET="a-long-random-server-secret"
//!
//! # Needed for the authenticated API
//! export DIRECTORY_URL="https://identity.example.com"
//! export DIRECTORY_API_KEY="..."
//!
//! # Start the service
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via
//! [`config::Config`]. See the [`config`] module for available options.

pub mod api;
pub mod application;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        LinkService, NewLinkSpec, ResolveError, ResolveOutcome, ResolverService,
    };
    pub use crate::crypto::keys::Keyring;
    pub use crate::domain::entities::{LinkPayload, LinkRecord, UserIndexEntry};
    pub use crate::domain::repositories::{AccountDirectory, AccountHandle, LinkRepository};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
