#![allow(dead_code)]

use std::sync::Arc;

use linkvault::application::services::{LinkService, NewLinkSpec, ResolverService};
use linkvault::crypto::keys::Keyring;
use linkvault::infrastructure::directory::MemoryAccountDirectory;
use linkvault::infrastructure::persistence::StoreLinkRepository;
use linkvault::infrastructure::store::{DocumentStore, MemoryDocumentStore};
use linkvault::state::AppState;

pub const KEY_SECRET: &str = "integration-test-secret";
pub const OWNER_UID: &str = "user-1";
pub const OWNER_EMAIL: &str = "owner@example.com";
pub const OWNER_TOKEN: &str = "token-user-1";
pub const BASE_URL: &str = "https://lv.example.com";

pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryDocumentStore>,
    pub directory: Arc<MemoryAccountDirectory>,
}

/// Builds an [`AppState`] over the in-memory store and directory, with one
/// seeded account and an issued session token.
pub fn create_test_state() -> TestContext {
    let store = Arc::new(MemoryDocumentStore::new());
    let directory =
        Arc::new(MemoryAccountDirectory::new().with_account(OWNER_UID, OWNER_EMAIL, "hunter2"));
    directory.seed_session(OWNER_TOKEN, OWNER_UID, OWNER_EMAIL);

    let store_handle: Arc<dyn DocumentStore> = store.clone();
    let records = Arc::new(StoreLinkRepository::new(store_handle));
    let keyring = Keyring::new(KEY_SECRET);

    let resolver = Arc::new(ResolverService::new(records.clone(), keyring.clone()));
    let links = Arc::new(LinkService::new(
        records,
        keyring,
        BASE_URL.to_string(),
        6,
    ));

    TestContext {
        state: AppState {
            resolver,
            links,
            directory: directory.clone(),
            store: store.clone(),
        },
        store,
        directory,
    }
}

pub fn spec(url: &str) -> NewLinkSpec {
    NewLinkSpec {
        destination_url: url.to_string(),
        ..Default::default()
    }
}

/// Creates a link for the seeded owner and returns its slug.
pub async fn seed_link(ctx: &TestContext, spec: NewLinkSpec) -> String {
    ctx.state
        .links
        .create_link(OWNER_UID, spec)
        .await
        .expect("seed link")
        .slug
}

/// Reads the stored click counter for a slug.
pub async fn click_count(ctx: &TestContext, slug: &str) -> u64 {
    ctx.store
        .read(&format!("links/{slug}/clickCount"))
        .await
        .unwrap()
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
}
