//! CLI administration tool for LinkUp.
//!
//! Users and API tokens are provisioned here; the HTTP API has no endpoints
//! for either.
//!
//! # Usage
//!
//! ```bash
//! # Register a link owner
//! cargo run --bin admin -- user create owner@example.com
//!
//! # Create an API token for them
//! cargo run --bin admin -- token create --user owner@example.com --name "Laptop"
//!
//! # List and revoke tokens
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke "Laptop"
//!
//! # Overall counts and database checks
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server's

use linkup::application::services::auth_service::hash_token;
use linkup::domain::entities::User;
use linkup::domain::repositories::{TokenRepository, UserRepository};
use linkup::infrastructure::persistence::{PgTokenRepository, PgUserRepository};
use linkup::utils::path_generator::random_alphanumeric;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

const TOKEN_LEN: usize = 48;

/// CLI tool for managing LinkUp.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage link owners
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a user by email
    Create { email: String },

    /// List all users
    List,
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Owner of the token, by email or numeric id
        #[arg(short, long)]
        user: Option<String>,

        /// Token name (e.g., "Laptop", "CI")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let users = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::Create { email } => {
            let email = email.trim();
            if !email.contains('@') {
                anyhow::bail!("'{}' is not an email address", email);
            }

            let user = users
                .create(email)
                .await
                .with_context(|| format!("Failed to create user {}", email))?;

            println!(
                "{} {} (id {})",
                "✅ User created:".green().bold(),
                user.email.cyan(),
                user.id
            );
        }
        UserAction::List => {
            let all = users.list().await.context("Failed to list users")?;

            if all.is_empty() {
                println!("{}", "  No users found".yellow());
                return Ok(());
            }

            println!(
                "  {:<5} {:<40} {}",
                "ID".bright_white().bold(),
                "Email".bright_white().bold(),
                "Created".bright_white().bold()
            );
            for user in &all {
                println!(
                    "  {:<5} {:<40} {}",
                    user.id.to_string().bright_black(),
                    user.email.cyan(),
                    user.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
                );
            }
            println!();
            println!("  Total: {}", all.len().to_string().bright_white().bold());
        }
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let tokens = PgTokenRepository::new(pool.clone());

    match action {
        TokenAction::Create { user, name, yes } => {
            let users = PgUserRepository::new(pool);
            create_token(&tokens, &users, user, name, yes).await?;
        }
        TokenAction::List => list_tokens(&tokens).await?,
        TokenAction::Revoke { name_or_id } => revoke_token(&tokens, &name_or_id).await?,
    }

    Ok(())
}

async fn find_user(users: &PgUserRepository, email_or_id: &str) -> Result<User> {
    let user = match email_or_id.parse::<i64>() {
        Ok(id) => users.find_by_id(id).await,
        Err(_) => users.find_by_email(email_or_id).await,
    }
    .context("Failed to look up user")?;

    user.with_context(|| format!("No user matches '{}'", email_or_id))
}

/// Creates a token for a user and prints it once.
///
/// Only the HMAC of the token under `TOKEN_SIGNING_SECRET` is stored, so the
/// secret must be the one the server runs with.
async fn create_token(
    tokens: &PgTokenRepository,
    users: &PgUserRepository,
    user: Option<String>,
    name: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let user = match user {
        Some(u) => u,
        None => Input::new().with_prompt("Owner email").interact_text()?,
    };
    let owner = find_user(users, user.trim()).await?;

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text(format!("{} API", owner.email))
            .interact_text()?,
    };

    let token_value = random_alphanumeric(TOKEN_LEN);

    println!("{}", "Token details:".bright_white().bold());
    println!("  Owner: {}", owner.email.cyan());
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  Save this token now, it is not stored in readable form."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    tokens
        .create_token(owner.id, &token_name, &hash_token(&secret, &token_value))
        .await
        .context("Failed to create token")?;

    println!("{}", "✅ Token created".green().bold());
    println!();
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/links",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(tokens: &PgTokenRepository) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let all = tokens.list_tokens().await.context("Failed to list tokens")?;

    if all.is_empty() {
        println!("{}", "  No tokens found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<6} {:<30} {:<17} {:<17} {}",
        "ID".bright_white().bold(),
        "User".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(88).bright_black());

    for token in &all {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<6} {:<30} {:<17} {:<17} {}",
            token.id.to_string().bright_black(),
            token.user_id.to_string().bright_black(),
            token.name.cyan(),
            token.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_used,
            status
        );
    }

    println!();
    println!("  Total: {}", all.len().to_string().bright_white().bold());

    Ok(())
}

/// Revokes a token by numeric id or exact name, after confirmation.
async fn revoke_token(tokens: &PgTokenRepository, name_or_id: &str) -> Result<()> {
    let token = match name_or_id.parse::<i64>() {
        Ok(id) => tokens.find_by_id(id).await,
        Err(_) => tokens.find_by_name(name_or_id).await,
    }
    .context("Failed to look up token")?
    .context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    tokens
        .revoke_token(token.id)
        .await
        .context("Failed to revoke token")?;

    println!("{}", "✅ Token revoked".green().bold());

    Ok(())
}

async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let rows = [
        ("Users", "SELECT COUNT(*) FROM users"),
        ("Links", "SELECT COUNT(*) FROM links"),
        ("Clicks", "SELECT COUNT(*) FROM link_clicks"),
        (
            "Active tokens",
            "SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL",
        ),
    ];

    for (label, query) in rows {
        let count: i64 = sqlx::query_scalar(query).fetch_one(pool).await?;
        println!(
            "  {:<15}{}",
            format!("{}:", label),
            count.to_string().bright_green().bold()
        );
    }
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", applied.to_string().bright_white());
        }
    }

    Ok(())
}
