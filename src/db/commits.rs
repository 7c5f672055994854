//! Database operations for mirrored commits and their articles.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::{commit, repository};
use crate::error::{AppError, AppResult};
use crate::models::commit::NewCommit;

/// Find all commits for a repository, newest first.
pub async fn find_by_repository(
    db: &DatabaseConnection,
    repository_id: Uuid,
) -> AppResult<Vec<commit::Model>> {
    let result = commit::Entity::find()
        .filter(commit::Column::RepositoryId.eq(repository_id))
        .order_by_desc(commit::Column::AuthorDate)
        .all(db)
        .await?;

    Ok(result)
}

/// Find a commit by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<commit::Model>> {
    let result = commit::Entity::find_by_id(id).one(db).await?;
    Ok(result)
}

/// Find a commit by ID together with its owning repository.
pub async fn find_with_repository(
    db: &DatabaseConnection,
    id: Uuid,
) -> AppResult<Option<(commit::Model, repository::Model)>> {
    let result = commit::Entity::find_by_id(id)
        .find_also_related(repository::Entity)
        .one(db)
        .await?;

    match result {
        Some((c, Some(r))) => Ok(Some((c, r))),
        Some((c, None)) => Err(AppError::Database(format!(
            "Commit {} has no owning repository",
            c.id
        ))),
        None => Ok(None),
    }
}

/// Insert a batch of freshly fetched commits for one repository.
/// Flushes once after all rows are staged; returns the persisted set.
pub async fn insert_many(
    db: &DatabaseConnection,
    repository_id: Uuid,
    commits: Vec<NewCommit>,
) -> AppResult<Vec<commit::Model>> {
    if commits.is_empty() {
        return Ok(Vec::new());
    }

    let now = Utc::now();
    let mut ids = Vec::with_capacity(commits.len());

    let models: Vec<commit::ActiveModel> = commits
        .into_iter()
        .map(|c| {
            let id = Uuid::new_v4();
            ids.push(id);
            commit::ActiveModel {
                id: Set(id),
                sha: Set(c.sha),
                message: Set(c.message),
                author_name: Set(c.author_name),
                author_email: Set(c.author_email),
                author_date: Set(c.author_date),
                repository_id: Set(repository_id),
                article_content: Set(None),
                article_generated: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
            }
        })
        .collect();

    commit::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;

    let inserted = commit::Entity::find()
        .filter(commit::Column::Id.is_in(ids))
        .order_by_desc(commit::Column::AuthorDate)
        .all(db)
        .await?;

    Ok(inserted)
}

/// Store a generated article on a commit and mark it generated.
pub async fn set_article(
    db: &DatabaseConnection,
    id: Uuid,
    content: String,
) -> AppResult<commit::Model> {
    let existing = commit::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Commit {}", id)))?;

    let mut model: commit::ActiveModel = existing.into();
    model.article_content = Set(Some(content));
    model.article_generated = Set(true);
    let updated = model.update(db).await?;

    Ok(updated)
}

/// Overwrite the article content of an already-generated commit.
/// The generated flag is left untouched.
pub async fn update_article_content(
    db: &DatabaseConnection,
    id: Uuid,
    content: String,
) -> AppResult<commit::Model> {
    let existing = commit::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Commit {}", id)))?;

    let mut model: commit::ActiveModel = existing.into();
    model.article_content = Set(Some(content));
    let updated = model.update(db).await?;

    Ok(updated)
}

/// List every generated article across all repositories owned by a user,
/// each with its owning repository eager-loaded.
pub async fn list_generated_for_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> AppResult<Vec<(commit::Model, repository::Model)>> {
    let rows = commit::Entity::find()
        .find_also_related(repository::Entity)
        .filter(commit::Column::ArticleGenerated.eq(true))
        .filter(repository::Column::OwnerId.eq(owner_id))
        .order_by_desc(commit::Column::UpdatedAt)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(rows.len());
    for (c, r) in rows {
        let r = r.ok_or_else(|| {
            AppError::Database(format!("Commit {} has no owning repository", c.id))
        })?;
        result.push((c, r));
    }

    Ok(result)
}
