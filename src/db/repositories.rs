//! Database operations for mirrored repositories.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::repository;
use crate::error::{AppError, AppResult};
use crate::models::repository::NewRepository;

/// Find all repositories owned by a user.
pub async fn find_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> AppResult<Vec<repository::Model>> {
    let result = repository::Entity::find()
        .filter(repository::Column::OwnerId.eq(owner_id))
        .order_by_asc(repository::Column::FullName)
        .all(db)
        .await?;

    Ok(result)
}

/// Find a repository by ID.
pub async fn find_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> AppResult<Option<repository::Model>> {
    let result = repository::Entity::find_by_id(id).one(db).await?;
    Ok(result)
}

/// Insert a batch of freshly fetched repositories for one owner.
/// Flushes once after all rows are staged; returns the persisted set.
pub async fn insert_many(
    db: &DatabaseConnection,
    owner_id: Uuid,
    repos: Vec<NewRepository>,
) -> AppResult<Vec<repository::Model>> {
    if repos.is_empty() {
        return Ok(Vec::new());
    }

    let now = Utc::now();
    let mut ids = Vec::with_capacity(repos.len());

    let models: Vec<repository::ActiveModel> = repos
        .into_iter()
        .map(|r| {
            let id = Uuid::new_v4();
            ids.push(id);
            repository::ActiveModel {
                id: Set(id),
                github_id: Set(r.github_id),
                name: Set(r.name),
                full_name: Set(r.full_name),
                description: Set(r.description),
                url: Set(r.url),
                owner_id: Set(owner_id),
                is_active: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
            }
        })
        .collect();

    repository::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;

    let inserted = repository::Entity::find()
        .filter(repository::Column::Id.is_in(ids))
        .order_by_asc(repository::Column::FullName)
        .all(db)
        .await?;

    Ok(inserted)
}

/// Flip the activation flag on a repository.
pub async fn set_active(
    db: &DatabaseConnection,
    id: Uuid,
    active: bool,
) -> AppResult<repository::Model> {
    let existing = repository::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Repository {}", id)))?;

    let mut model: repository::ActiveModel = existing.into();
    model.is_active = Set(active);
    let updated = model.update(db).await?;

    Ok(updated)
}
