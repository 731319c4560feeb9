//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use crate::application::services::{LinkService, ResolverService};
use crate::domain::repositories::AccountDirectory;
use crate::infrastructure::persistence::StoreLinkRepository;
use crate::infrastructure::store::DocumentStore;

/// Handler state: services plus the external collaborator handles.
///
/// Both services are concretely typed over [`StoreLinkRepository`]; the
/// repository itself holds a `dyn DocumentStore`, so tests swap the hosted
/// store for the in-memory one without touching this type.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResolverService<StoreLinkRepository>>,
    pub links: Arc<LinkService<StoreLinkRepository>>,
    pub directory: Arc<dyn AccountDirectory>,
    pub store: Arc<dyn DocumentStore>,
}
