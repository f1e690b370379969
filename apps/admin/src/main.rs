//! # Quill Admin
//!
//! Command-line management for content that has no web form: groups, and
//! accounts created on behalf of users.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quill_core::domain::{Group, User};
use quill_core::ports::{BaseRepository, GroupRepository, PasswordService, UserRepository};
use quill_infra::Argon2PasswordService;
use quill_infra::DatabaseConfig;
use quill_infra::database::{self, PostgresGroupRepository, PostgresUserRepository};

#[derive(Parser)]
#[command(name = "quill-admin")]
#[command(version, about = "Manage Quill groups and users")]
struct Cli {
    /// Database to operate on. Falls back to `DATABASE_URL` from the environment or `.env`.
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a group posts can be filed under
    CreateGroup {
        #[arg(long)]
        title: String,
        /// URL segment: letters, digits, hyphens and underscores
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Create a user account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,quill_admin=info")),
        )
        .init();

    let cli = Cli::parse();
    let Some(url) = cli.database_url else {
        bail!("DATABASE_URL is not set; pass --database-url or set it in the environment");
    };
    let config = DatabaseConfig {
        url,
        max_connections: 1,
        min_connections: 1,
    };
    let conn = database::connect(&config)
        .await
        .context("Failed to connect to the database")?;

    match cli.command {
        Commands::CreateGroup {
            title,
            slug,
            description,
        } => {
            let groups = PostgresGroupRepository::new(conn);
            let group = Group::new(title, slug, description);
            group.validate()?;
            if groups.find_by_slug(&group.slug).await?.is_some() {
                bail!("A group with slug '{}' already exists", group.slug);
            }
            let group = groups.create(group).await?;
            tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
            println!("Created group '{}' at /group/{}/", group, group.slug);
        }
        Commands::CreateUser { username, password } => {
            if !User::is_valid_username(&username) {
                bail!("Invalid username '{username}'");
            }
            let users = PostgresUserRepository::new(conn);
            if users.find_by_username(&username).await?.is_some() {
                bail!("User '{username}' already exists");
            }
            let hash = Argon2PasswordService::new().hash(&password)?;
            let user = users.create(User::new(username, hash)).await?;
            tracing::info!(user_id = %user.id, "User created");
            println!("Created user '{}'", user.username);
        }
    }

    Ok(())
}
