//! Migration CLI tool.
//!
//! `migration up`, `migration down`, `migration status`; reads `DATABASE_URL`.
//! The CLI installs its own tracing subscriber (`-v` for debug output).

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(migration::Migrator).await;
}
