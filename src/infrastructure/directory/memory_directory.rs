//! In-process account directory for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

use crate::domain::repositories::{AccountDirectory, AccountHandle, AuthError};

struct Account {
    password: String,
    handle: AccountHandle,
}

/// [`AccountDirectory`] holding a fixed set of accounts in memory.
///
/// Sessions are plain opaque strings: `authenticate` issues
/// `session-{uid}`, and tokens can be seeded directly with
/// [`seed_session`](Self::seed_session) for handler tests.
pub struct MemoryAccountDirectory {
    accounts: Mutex<HashMap<String, Account>>,
    tokens: Mutex<HashMap<String, AccountHandle>>,
    session: watch::Sender<Option<AccountHandle>>,
}

impl Default for MemoryAccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAccountDirectory {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            session,
        }
    }

    /// Adds an account. Builder-style for test setup.
    pub fn with_account(self, uid: &str, email: &str, password: &str) -> Self {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                handle: AccountHandle {
                    uid: uid.to_string(),
                    email: email.to_string(),
                },
            },
        );
        self
    }

    /// Registers a bearer token for an account without going through
    /// `authenticate`.
    pub fn seed_session(&self, token: &str, uid: &str, email: &str) {
        self.tokens.lock().unwrap().insert(
            token.to_string(),
            AccountHandle {
                uid: uid.to_string(),
                email: email.to_string(),
            },
        );
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccountDirectory {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccountHandle, AuthError> {
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }

        let handle = {
            let accounts = self.accounts.lock().unwrap();
            let account = accounts.get(email).ok_or(AuthError::UserNotFound)?;
            if account.password != password {
                return Err(AuthError::WrongPassword);
            }
            account.handle.clone()
        };

        let token = format!("session-{}", handle.uid);
        self.tokens.lock().unwrap().insert(token, handle.clone());
        self.session.send_replace(Some(handle.clone()));

        Ok(handle)
    }

    async fn verify_session(&self, token: &str) -> Result<AccountHandle, AuthError> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidSession)
    }

    async fn current_account(&self) -> Option<AccountHandle> {
        self.session.borrow().clone()
    }

    async fn sign_out(&self) {
        self.session.send_replace(None);
    }

    fn subscribe(&self) -> watch::Receiver<Option<AccountHandle>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> MemoryAccountDirectory {
        MemoryAccountDirectory::new().with_account("user-1", "a@example.com", "hunter2")
    }

    #[tokio::test]
    async fn test_authenticate_success_establishes_session() {
        let directory = directory();

        let handle = directory.authenticate("a@example.com", "hunter2").await.unwrap();
        assert_eq!(handle.uid, "user-1");
        assert_eq!(directory.current_account().await, Some(handle.clone()));

        // The issued token resolves back to the account.
        let resolved = directory.verify_session("session-user-1").await.unwrap();
        assert_eq!(resolved, handle);
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let directory = directory();

        assert_eq!(
            directory.authenticate("not-an-email", "x").await.unwrap_err(),
            AuthError::InvalidEmail
        );
        assert_eq!(
            directory.authenticate("b@example.com", "x").await.unwrap_err(),
            AuthError::UserNotFound
        );
        assert_eq!(
            directory.authenticate("a@example.com", "wrong").await.unwrap_err(),
            AuthError::WrongPassword
        );
    }

    #[tokio::test]
    async fn test_sign_out_notifies_subscribers() {
        let directory = directory();
        let mut updates = directory.subscribe();

        directory.authenticate("a@example.com", "hunter2").await.unwrap();
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().is_some());

        directory.sign_out().await;
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn test_seeded_session() {
        let directory = directory();
        directory.seed_session("tok", "user-9", "x@example.com");

        let handle = directory.verify_session("tok").await.unwrap();
        assert_eq!(handle.uid, "user-9");

        assert_eq!(
            directory.verify_session("unknown").await.unwrap_err(),
            AuthError::InvalidSession
        );
    }
}
