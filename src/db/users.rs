//! Database operations for users.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::user;
use crate::error::{AppError, AppResult};

/// Find or create a user by GitHub ID. The stored access token is
/// overwritten with the latest value on every login.
pub async fn upsert_from_github(
    db: &DatabaseConnection,
    github_id: i64,
    username: &str,
    email: Option<&str>,
    avatar_url: Option<&str>,
    access_token: &str,
) -> AppResult<user::Model> {
    let existing = user::Entity::find()
        .filter(user::Column::GithubId.eq(github_id))
        .one(db)
        .await?;

    if let Some(m) = existing {
        // Profile fields keep their first-login values; only the token moves.
        let mut active: user::ActiveModel = m.into();
        active.access_token = Set(Some(access_token.to_string()));
        let updated = active.update(db).await?;
        return Ok(updated);
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    let model = user::ActiveModel {
        id: Set(id),
        github_id: Set(github_id),
        username: Set(username.to_string()),
        email: Set(email.map(|s| s.to_string())),
        avatar_url: Set(avatar_url.map(|s| s.to_string())),
        access_token: Set(Some(access_token.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user::Entity::insert(model).exec(db).await?;

    let inserted = user::Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
        AppError::Database("Failed to fetch newly inserted user".to_string())
    })?;

    Ok(inserted)
}

/// Find a user by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<user::Model>> {
    let result = user::Entity::find_by_id(id).one(db).await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::test_support::user_model;

    #[actix_rt::test]
    async fn test_existing_user_login_only_supersedes_access_token() {
        let id = Uuid::new_v4();
        let existing = user_model(id, Some("old-token"));
        let updated_row = {
            let mut u = existing.clone();
            u.access_token = Some("new-token".to_string());
            u
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([vec![updated_row]])
            .into_connection();

        // A later login may carry a changed username and email.
        let updated = upsert_from_github(&db, 1001, "renamed", Some("new@example.com"), None, "new-token")
            .await
            .unwrap();

        assert_eq!(updated.access_token.as_deref(), Some("new-token"));
        assert_eq!(updated.username, "octocat");

        // The UPDATE binds the token only; profile fields are untouched.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        let update_stmt = format!("{:?}", log[1]);
        assert!(update_stmt.contains("new-token"));
        assert!(!update_stmt.contains("renamed"));
        assert!(!update_stmt.contains("new@example.com"));
    }
}
