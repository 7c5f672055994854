//! Migration: Create commits table.
//!
//! Mirrors repository commits and stores the generated article per commit.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE commits (
                    id UUID PRIMARY KEY,
                    sha VARCHAR(64) NOT NULL,
                    message TEXT NOT NULL,
                    author_name VARCHAR(255),
                    author_email VARCHAR(255),
                    author_date TIMESTAMPTZ NOT NULL,
                    repository_id UUID NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
                    article_content TEXT,
                    article_generated BOOLEAN NOT NULL DEFAULT FALSE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_commits_repository_id ON commits(repository_id);
                CREATE INDEX idx_commits_sha ON commits(sha);

                -- Listing generated articles filters on this flag
                CREATE INDEX idx_commits_article_generated
                    ON commits(repository_id)
                    WHERE article_generated;

                CREATE TRIGGER update_commits_updated_at
                    BEFORE UPDATE ON commits
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_commits_updated_at ON commits;
                DROP TABLE IF EXISTS commits CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
