//! Renames `comments.created` to `comments.pub_date` and documents `comments.text`.
//!
//! The rename is an in-place `ALTER TABLE ... RENAME COLUMN`, so existing
//! timestamps are kept.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

use super::m20220201_000004_create_comments::Comments;

pub const COMMENT_TEXT_LABEL: &str = "Comment text";
pub const COMMENT_TEXT_HELP: &str = "Text of the new comment";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Comments::Table)
                    .rename_column(Comments::Created, Comments::PubDate)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(&format!(
                "COMMENT ON COLUMN comments.text IS '{COMMENT_TEXT_LABEL}: {COMMENT_TEXT_HELP}'"
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("COMMENT ON COLUMN comments.text IS NULL")
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Comments::Table)
                    .rename_column(Comments::PubDate, Comments::Created)
                    .to_owned(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::sea_orm::{
        DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult,
    };

    use super::*;

    const RENAME_UP: &str = r#"ALTER TABLE "comments" RENAME COLUMN "created" TO "pub_date""#;
    const RENAME_DOWN: &str = r#"ALTER TABLE "comments" RENAME COLUMN "pub_date" TO "created""#;

    fn mock_db(statements: usize) -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult::default(); statements])
            .into_connection()
    }

    fn executed_sql(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_up_renames_in_place_and_documents_text() {
        let db = mock_db(2);
        Migration.up(&SchemaManager::new(&db)).await.unwrap();

        let sql = executed_sql(db);

        assert_eq!(
            sql,
            [
                RENAME_UP.to_string(),
                format!(
                    "COMMENT ON COLUMN comments.text IS '{COMMENT_TEXT_LABEL}: {COMMENT_TEXT_HELP}'"
                ),
            ]
        );
        assert!(!sql.iter().any(|s| s.contains("DROP")));
    }

    #[tokio::test]
    async fn test_down_reverses_up() {
        let db = mock_db(2);
        Migration.down(&SchemaManager::new(&db)).await.unwrap();

        assert_eq!(
            executed_sql(db),
            [
                "COMMENT ON COLUMN comments.text IS NULL".to_string(),
                RENAME_DOWN.to_string(),
            ]
        );
    }
}
