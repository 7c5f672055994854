//! Migration: Create repositories table.
//!
//! Mirrors a user's GitHub repositories. Populated in bulk on first fetch.

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
                CREATE TABLE repositories (
                    id UUID PRIMARY KEY,
                    github_id BIGINT NOT NULL,
                    name VARCHAR(255) NOT NULL,
                    full_name VARCHAR(255) NOT NULL,
                    description TEXT,
                    url VARCHAR(500) NOT NULL,
                    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    is_active BOOLEAN NOT NULL DEFAULT FALSE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Non-unique: concurrent first fetches can insert duplicate rows
                CREATE INDEX idx_repositories_github_id ON repositories(github_id);

                CREATE INDEX idx_repositories_owner_id ON repositories(owner_id);

                CREATE TRIGGER update_repositories_updated_at
                    BEFORE UPDATE ON repositories
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
                DROP TRIGGER IF EXISTS update_repositories_updated_at ON repositories;
                DROP TABLE IF EXISTS repositories CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
