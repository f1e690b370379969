//! Schema history for users, groups, posts and comments.
//!
//! Migrations only add tables or rename columns; each one has a `down`.

pub use sea_orm_migration::prelude::*;

mod m20220101_000001_create_users;
mod m20220101_000002_create_groups;
mod m20220101_000003_create_posts;
mod m20220201_000004_create_comments;
mod m20220221_000005_comment_pub_date;

pub use m20220221_000005_comment_pub_date::{COMMENT_TEXT_HELP, COMMENT_TEXT_LABEL};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000001_create_users::Migration),
            Box::new(m20220101_000002_create_groups::Migration),
            Box::new(m20220101_000003_create_posts::Migration),
            Box::new(m20220201_000004_create_comments::Migration),
            Box::new(m20220221_000005_comment_pub_date::Migration),
        ]
    }
}
