//! Account directory port: the external identity collaborator.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;

/// A signed-in account as seen by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountHandle {
    pub uid: String,
    pub email: String,
}

/// Errors surfaced by the account directory.
///
/// The fine-grained kinds exist for sign-in surfaces; the core consumes the
/// directory only to attribute ownership, so most call sites collapse these
/// to an unauthorized response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("email address is malformed")]
    InvalidEmail,

    #[error("no account matches this email")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("email is already registered")]
    EmailInUse,

    #[error("password does not meet strength requirements")]
    WeakPassword,

    #[error("too many attempts, try again later")]
    RateLimited,

    #[error("session token rejected")]
    InvalidSession,

    #[error("account directory unreachable: {0}")]
    Network(String),
}

/// Interface to the hosted identity provider.
///
/// Implementations hold the current session and broadcast changes over a
/// watch channel, so collaborators can react to sign-in/sign-out without
/// polling.
///
/// # Implementations
///
/// - [`crate::infrastructure::directory::RestAccountDirectory`] - identity
///   provider REST API
/// - [`crate::infrastructure::directory::MemoryAccountDirectory`] - fixed
///   accounts for tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Signs in with email and password, establishing the current session.
    async fn authenticate(&self, email: &str, password: &str)
    -> Result<AccountHandle, AuthError>;

    /// Maps a bearer session token to the account it was issued for.
    async fn verify_session(&self, token: &str) -> Result<AccountHandle, AuthError>;

    /// Returns the currently signed-in account, if any.
    async fn current_account(&self) -> Option<AccountHandle>;

    /// Clears the current session.
    async fn sign_out(&self);

    /// Subscribes to account state changes.
    fn subscribe(&self) -> watch::Receiver<Option<AccountHandle>>;
}
