//! CLI administration tool for linkvault.
//!
//! Creates, inspects, and deletes links directly against the document store,
//! without requiring the HTTP API or a directory session.
//!
//! # Usage
//!
//! ```bash
//! # Create a link for an account
//! cargo run --bin admin -- link create --owner uid123 --url https://example.com
//!
//! # Inspect a stored record
//! cargo run --bin admin -- link inspect Ab3xQ9
//!
//! # Delete a link (record + owner index entry)
//! cargo run --bin admin -- link delete Ab3xQ9
//!
//! # Check store connectivity
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_URL` (required): document store base URL
//! - `LINK_KEY_SECRET` (required for create/inspect): server key secret
//! - `STORE_AUTH_TOKEN`, `BASE_URL`: optional, as for the server

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use std::sync::Arc;
use std::time::Duration;

use linkvault::application::services::{LinkService, NewLinkSpec};
use linkvault::crypto::{codec, keys::Keyring};
use linkvault::domain::repositories::LinkRepository;
use linkvault::infrastructure::persistence::StoreLinkRepository;
use linkvault::infrastructure::store::{DocumentStore, RestDocumentStore};
use linkvault::utils::slug_generator::MIN_SLUG_LENGTH;

/// CLI tool for managing linkvault.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Store operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a link on behalf of an account
    Create {
        /// Owning account id
        #[arg(short, long)]
        owner: Option<String>,

        /// Destination URL
        #[arg(short, long)]
        url: Option<String>,

        /// Custom slug (auto-generated if not provided)
        #[arg(short, long)]
        slug: Option<String>,

        /// Protect the link with a password (prompted interactively)
        #[arg(short, long)]
        protected: bool,

        /// Expiry as RFC 3339 (e.g. 2027-01-01T00:00:00Z)
        #[arg(long)]
        expires: Option<String>,

        /// Maximum number of clicks
        #[arg(long)]
        max_clicks: Option<u64>,
    },

    /// Show a stored record
    Inspect {
        /// Slug to inspect
        slug: String,
    },

    /// Delete a link and its owner index entry
    Delete {
        /// Slug to delete
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Store operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check store connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let store_url = std::env::var("STORE_URL").context("STORE_URL must be set")?;
    let auth_token = std::env::var("STORE_AUTH_TOKEN").ok().filter(|v| !v.is_empty());

    let store: Arc<dyn DocumentStore> = Arc::new(
        RestDocumentStore::connect(&store_url, auth_token, Duration::from_secs(10))
            .map_err(|e| anyhow::anyhow!("Failed to build store client: {}", e))?,
    );

    match cli.command {
        Commands::Link { action } => handle_link_action(action, store).await?,
        Commands::Db { action } => handle_db_action(action, store).await?,
    }

    Ok(())
}

fn keyring() -> Result<Keyring> {
    let secret = std::env::var("LINK_KEY_SECRET").context("LINK_KEY_SECRET must be set")?;
    Ok(Keyring::new(secret))
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, store: Arc<dyn DocumentStore>) -> Result<()> {
    let repo = Arc::new(StoreLinkRepository::new(store));

    match action {
        LinkAction::Create {
            owner,
            url,
            slug,
            protected,
            expires,
            max_clicks,
        } => create_link(repo, owner, url, slug, protected, expires, max_clicks).await?,
        LinkAction::Inspect { slug } => inspect_link(repo, slug).await?,
        LinkAction::Delete { slug, yes } => delete_link(repo, slug, yes).await?,
    }

    Ok(())
}

/// Creates a link with interactive prompts for missing arguments.
#[allow(clippy::too_many_arguments)]
async fn create_link(
    repo: Arc<StoreLinkRepository>,
    owner: Option<String>,
    url: Option<String>,
    slug: Option<String>,
    protected: bool,
    expires: Option<String>,
    max_clicks: Option<u64>,
) -> Result<()> {
    println!("{}", "🔗 Create Link".bright_blue().bold());
    println!();

    let owner_id: String = match owner {
        Some(o) => o,
        None => Input::new().with_prompt("Owner account id").interact_text()?,
    };

    let destination: String = match url {
        Some(u) => u,
        None => Input::new().with_prompt("Destination URL").interact_text()?,
    };

    let password = if protected {
        Some(
            Password::new()
                .with_prompt("Link password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?,
        )
    } else {
        None
    };

    let expires_at = match expires {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(&raw)
                .context("Expiry must be RFC 3339, e.g. 2027-01-01T00:00:00Z")?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let service = LinkService::new(repo, keyring()?, base_url(), MIN_SLUG_LENGTH);

    let created = service
        .create_link(
            &owner_id,
            NewLinkSpec {
                destination_url: destination,
                custom_slug: slug,
                password,
                expires_at,
                max_clicks,
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!();
    println!("{}", "✅ Link created!".green().bold());
    println!("  Slug:      {}", created.slug.cyan());
    println!("  Short URL: {}", created.short_url.bright_yellow().bold());
    println!("  Targets:   {}", created.destination_url);
    println!();

    Ok(())
}

/// Shows a stored record, decrypting the destination when possible.
async fn inspect_link(repo: Arc<StoreLinkRepository>, slug: String) -> Result<()> {
    let record = repo
        .get(&slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load record: {}", e))?
        .with_context(|| format!("No record for slug '{}'", slug))?;

    println!("{}", format!("🔎 Record {}", record.slug).bright_blue().bold());
    println!();
    println!("  Owner:     {}", record.owner_id.cyan());
    println!("  Created:   {}", record.created_at);
    println!("  Clicks:    {}", record.click_count);
    println!(
        "  Active:    {}",
        if record.is_active { "yes".green() } else { "no".red() }
    );
    println!(
        "  Protected: {}",
        if record.password_protected { "yes".yellow() } else { "no".normal() }
    );

    match record.expires_at {
        Some(expiry) if record.is_expired() => {
            println!("  Expires:   {} {}", expiry, "(expired)".red())
        }
        Some(expiry) => println!("  Expires:   {}", expiry),
        None => println!("  Expires:   never"),
    }

    match record.max_clicks {
        Some(max) => println!("  Quota:     {}/{}", record.click_count, max),
        None => println!("  Quota:     unlimited"),
    }

    match keyring() {
        Ok(keyring) => {
            let destination = keyring
                .user_key(&record.owner_id)
                .ok()
                .and_then(|key| {
                    codec::decrypt(&record.encrypted_payload, &key, &record.iv, &record.salt).ok()
                })
                .map(|payload| payload.destination_url);

            match destination {
                Some(url) => println!("  Targets:   {}", url.bright_yellow()),
                None => println!("  Targets:   {}", "(payload does not decrypt)".red()),
            }
        }
        Err(_) => println!("  Targets:   (set LINK_KEY_SECRET to decrypt)"),
    }

    println!();
    Ok(())
}

/// Deletes a link after confirmation.
async fn delete_link(repo: Arc<StoreLinkRepository>, slug: String, skip_confirm: bool) -> Result<()> {
    let record = repo
        .get(&slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load record: {}", e))?
        .with_context(|| format!("No record for slug '{}'", slug))?;

    println!(
        "Deleting '{}' owned by {} ({} clicks)",
        record.slug.cyan(),
        record.owner_id,
        record.click_count
    );

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.remove(&slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to remove record: {}", e))?;
    repo.remove_index_entry(&record.owner_id, &slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to remove index entry: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    Ok(())
}

/// Dispatches store operation commands.
async fn handle_db_action(action: DbAction, store: Arc<dyn DocumentStore>) -> Result<()> {
    match action {
        DbAction::Check => {
            if store.health_check().await {
                println!("{}", "✅ Store is reachable".green().bold());
            } else {
                println!("{}", "❌ Store did not respond".red().bold());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
