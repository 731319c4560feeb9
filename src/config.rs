//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server
//! starts.
//!
//! ## Required Variables
//!
//! - `STORE_URL` - base URL of the hosted document store
//! - `LINK_KEY_SECRET` - server-held secret for link key derivation. Must be
//!   non-empty; without it, encryption keys would be derivable from public
//!   account ids alone.
//!
//! ## Optional Variables
//!
//! - `STORE_AUTH_TOKEN` - access token appended to store requests
//! - `STORE_TIMEOUT_SECONDS` - store request timeout (default: 10)
//! - `DIRECTORY_URL` / `DIRECTORY_API_KEY` - identity provider endpoint and
//!   key (required to serve the authenticated API, not for the admin CLI)
//! - `BASE_URL` - public origin for short URLs (default: `http://localhost:3000`)
//! - `LISTEN` - bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - log level (default: `info`)
//! - `LOG_FORMAT` - log format: `text` or `json` (default: `text`)
//! - `SLUG_LENGTH` - generated slug length, 6-8 (default: 6)

use anyhow::{Context, Result};
use std::env;

use crate::utils::slug_generator::{MAX_SLUG_LENGTH, MIN_SLUG_LENGTH};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub store_auth_token: Option<String>,
    pub store_timeout_seconds: u64,
    pub directory_url: Option<String>,
    pub directory_api_key: Option<String>,
    /// Server-held secret feeding per-owner key derivation. Never logged.
    pub link_key_secret: String,
    pub base_url: String,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    pub slug_length: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing.
    pub fn from_env() -> Result<Self> {
        let store_url = env::var("STORE_URL").context("STORE_URL must be set")?;
        let store_auth_token = env::var("STORE_AUTH_TOKEN").ok().filter(|v| !v.is_empty());

        let store_timeout_seconds = env::var("STORE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let directory_url = env::var("DIRECTORY_URL").ok().filter(|v| !v.is_empty());
        let directory_api_key = env::var("DIRECTORY_API_KEY").ok().filter(|v| !v.is_empty());

        let link_key_secret =
            env::var("LINK_KEY_SECRET").context("LINK_KEY_SECRET must be set")?;

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let slug_length = env::var("SLUG_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(MIN_SLUG_LENGTH);

        Ok(Self {
            store_url,
            store_auth_token,
            store_timeout_seconds,
            directory_url,
            directory_api_key,
            link_key_secret,
            base_url,
            listen_addr,
            log_level,
            log_format,
            slug_length,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `STORE_URL` / `BASE_URL` / `DIRECTORY_URL` are not HTTP(S) URLs
    /// - `LINK_KEY_SECRET` is empty
    /// - `SLUG_LENGTH` is outside 6-8
    /// - `LOG_FORMAT` is not `text` or `json`
    /// - `LISTEN` is not `host:port`
    /// - `STORE_TIMEOUT_SECONDS` is zero or above 120
    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.store_url) {
            anyhow::bail!(
                "STORE_URL must start with 'http://' or 'https://', got '{}'",
                self.store_url
            );
        }

        if !is_http_url(&self.base_url) {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        if let Some(ref url) = self.directory_url
            && !is_http_url(url)
        {
            anyhow::bail!(
                "DIRECTORY_URL must start with 'http://' or 'https://', got '{}'",
                url
            );
        }

        if self.link_key_secret.is_empty() {
            anyhow::bail!("LINK_KEY_SECRET must not be empty");
        }

        if !(MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&self.slug_length) {
            anyhow::bail!(
                "SLUG_LENGTH must be between {} and {}, got {}",
                MIN_SLUG_LENGTH,
                MAX_SLUG_LENGTH,
                self.slug_length
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.store_timeout_seconds == 0 || self.store_timeout_seconds > 120 {
            anyhow::bail!(
                "STORE_TIMEOUT_SECONDS must be between 1 and 120, got {}",
                self.store_timeout_seconds
            );
        }

        Ok(())
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Store: {}", self.store_url);
        tracing::info!(
            "  Store auth: {}",
            if self.store_auth_token.is_some() { "configured" } else { "none" }
        );

        match &self.directory_url {
            Some(url) => tracing::info!("  Directory: {}", url),
            None => tracing::info!("  Directory: not configured"),
        }

        tracing::info!("  Slug length: {}", self.slug_length);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// Expects environment variables to be already loaded (e.g. via
/// `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
