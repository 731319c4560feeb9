//! Business logic services for the application layer.

pub mod link_service;
pub mod resolver_service;

pub use link_service::{CreatedLink, LinkService, NewLinkSpec, OwnedLink};
pub use resolver_service::{PasswordGate, ResolveError, ResolveOutcome, Resolved, ResolverService};
