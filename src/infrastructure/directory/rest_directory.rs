//! REST client for the hosted identity provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::domain::repositories::{AccountDirectory, AccountHandle, AuthError};

/// [`AccountDirectory`] over the identity provider's REST API.
///
/// Sign-in goes through `accounts:signInWithPassword`, bearer tokens are
/// resolved through `accounts:lookup`. Provider error codes are mapped onto
/// the [`AuthError`] taxonomy; anything unrecognized is treated as a rejected
/// session rather than leaked upstream.
pub struct RestAccountDirectory {
    client: Client,
    base_url: String,
    api_key: String,
    session: watch::Sender<Option<AccountHandle>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl RestAccountDirectory {
    /// Builds a directory client.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Network`] if the HTTP client cannot be built.
    pub fn connect(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let (session, _) = watch::channel(None);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            session,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/v1/accounts:{}", self.base_url, action)
    }

    /// Maps provider error codes onto the [`AuthError`] taxonomy.
    fn map_error_code(code: &str) -> AuthError {
        // Rate-limit codes arrive with a trailing explanation.
        let normalized = code.split(':').next().unwrap_or(code).trim();
        match normalized {
            "INVALID_EMAIL" => AuthError::InvalidEmail,
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" | "USER_DISABLED" => AuthError::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::WrongPassword,
            "EMAIL_EXISTS" => AuthError::EmailInUse,
            "WEAK_PASSWORD" => AuthError::WeakPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::RateLimited,
            "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => AuthError::InvalidSession,
            other => {
                debug!(code = other, "unmapped directory error code");
                AuthError::InvalidSession
            }
        }
    }

    async fn error_from_response(response: reqwest::Response) -> AuthError {
        match response.json::<ApiErrorBody>().await {
            Ok(body) => Self::map_error_code(&body.error.message),
            Err(e) => AuthError::Network(e.to_string()),
        }
    }
}

#[async_trait]
impl AccountDirectory for RestAccountDirectory {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccountHandle, AuthError> {
        let response = self
            .client
            .post(self.endpoint("signInWithPassword"))
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let handle = AccountHandle {
            uid: body.local_id,
            email: body.email,
        };
        self.session.send_replace(Some(handle.clone()));

        Ok(handle)
    }

    async fn verify_session(&self, token: &str) -> Result<AccountHandle, AuthError> {
        let response = self
            .client
            .post(self.endpoint("lookup"))
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let user = body.users.into_iter().next().ok_or(AuthError::InvalidSession)?;
        Ok(AccountHandle {
            uid: user.local_id,
            email: user.email,
        })
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
