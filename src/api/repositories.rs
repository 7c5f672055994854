//! Repository API handlers.
//!
//! Listing uses a fetch-if-empty policy: locally stored repositories are
//! returned when any exist; otherwise one fixed page is fetched from GitHub
//! and persisted. A populated list never refreshes automatically.

use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::{self, DbPool};
use crate::entity::{repository, user};
use crate::error::{AppError, AppResult};
use crate::models::{NewRepository, RepositoryResponse};
use crate::services::GitHubClient;

fn to_response(repos: Vec<repository::Model>) -> Vec<RepositoryResponse> {
    repos.into_iter().map(RepositoryResponse::from).collect()
}

/// Load a repository and verify the caller owns it.
async fn find_owned_repository(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
) -> AppResult<repository::Model> {
    let repository = db::repositories::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Repository {}", id)))?;

    if repository.owner_id != user_id {
        return Err(AppError::Ownership(
            "Repository not owned by user".to_string(),
        ));
    }

    Ok(repository)
}

/// Return the user's stored repositories, mirroring one page from GitHub
/// first when none are stored yet. A populated mirror makes no provider call.
async fn list_or_mirror(
    db: &DatabaseConnection,
    github: &GitHubClient,
    user: &user::Model,
) -> AppResult<Vec<repository::Model>> {
    let existing = db::repositories::find_by_owner(db, user.id).await?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    let access_token = user.access_token.as_deref().ok_or_else(|| {
        AppError::Unauthorized("No GitHub access token stored for user".to_string())
    })?;

    // Persistence happens only after the full response is obtained.
    let fetched = github.list_repositories(access_token).await?;
    let new_repos: Vec<NewRepository> = fetched.into_iter().map(NewRepository::from).collect();
    let persisted = db::repositories::insert_many(db, user.id, new_repos).await?;

    info!(
        "Mirrored {} repositories for user '{}'",
        persisted.len(),
        user.username
    );

    Ok(persisted)
}

/// List the caller's repositories, fetching from GitHub on first access.
#[utoipa::path(
    get,
    path = "/repositories",
    tag = "Repositories",
    responses(
        (status = 200, description = "Caller's repositories", body = [RepositoryResponse]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 502, description = "GitHub fetch failed", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_repositories(
    session: SessionAuth,
    pool: web::Data<DbPool>,
    github: web::Data<GitHubClient>,
) -> AppResult<HttpResponse> {
    let user = db::users::find_by_id(pool.connection(), session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let repos = list_or_mirror(pool.connection(), github.get_ref(), &user).await?;

    Ok(HttpResponse::Ok().json(to_response(repos)))
}

/// Get a single repository by ID.
#[utoipa::path(
    get,
    path = "/repositories/{id}",
    tag = "Repositories",
    params(
        ("id" = Uuid, Path, description = "Repository UUID")
    ),
    responses(
        (status = 200, description = "Repository details", body = RepositoryResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Repository not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_repository(
    session: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let repository =
        find_owned_repository(pool.connection(), path.into_inner(), session.user_id).await?;
    Ok(HttpResponse::Ok().json(RepositoryResponse::from(repository)))
}

/// Activate a repository.
#[utoipa::path(
    post,
    path = "/repositories/{id}/activate",
    tag = "Repositories",
    params(
        ("id" = Uuid, Path, description = "Repository UUID")
    ),
    responses(
        (status = 200, description = "Repository activated", body = RepositoryResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Repository not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn activate_repository(
    session: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let updated =
        set_repository_active(pool.connection(), path.into_inner(), session.user_id, true).await?;
    Ok(HttpResponse::Ok().json(RepositoryResponse::from(updated)))
}

/// Deactivate a repository.
#[utoipa::path(
    post,
    path = "/repositories/{id}/deactivate",
    tag = "Repositories",
    params(
        ("id" = Uuid, Path, description = "Repository UUID")
    ),
    responses(
        (status = 200, description = "Repository deactivated", body = RepositoryResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Repository not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn deactivate_repository(
    session: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let updated =
        set_repository_active(pool.connection(), path.into_inner(), session.user_id, false)
            .await?;
    Ok(HttpResponse::Ok().json(RepositoryResponse::from(updated)))
}

async fn set_repository_active(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
    active: bool,
) -> AppResult<repository::Model> {
    find_owned_repository(db, id, user_id).await?;

    let updated = db::repositories::set_active(db, id, active).await?;

    info!(
        "Repository {} {} by user {}",
        id,
        if active { "activated" } else { "deactivated" },
        user_id
    );

    Ok(updated)
}

/// Configure repository routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/repositories").route(web::get().to(list_repositories)))
        .service(web::resource("/repositories/{id}").route(web::get().to(get_repository)))
        .service(
            web::resource("/repositories/{id}/activate")
                .route(web::post().to(activate_repository)),
        )
        .service(
            web::resource("/repositories/{id}/deactivate")
                .route(web::post().to(deactivate_repository)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::test_support::{
        UNREACHABLE_BASE_URL, github_settings, repository_model, spawn_stub_server, user_model,
    };

    #[actix_rt::test]
    async fn test_populated_list_is_served_without_provider_call() {
        let owner = Uuid::new_v4();
        let user = user_model(owner, Some("gh-token"));
        let stored = repository_model(Uuid::new_v4(), owner);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();
        // Any HTTP call would fail against this base URL.
        let github = GitHubClient::new(github_settings(UNREACHABLE_BASE_URL));

        let listed = list_or_mirror(&db, &github, &user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].full_name, "octocat/widget");

        // One SELECT, no INSERT.
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[actix_rt::test]
    async fn test_empty_list_fetches_once_and_persists() {
        let owner = Uuid::new_v4();
        let user = user_model(owner, Some("gh-token"));

        let base_url = spawn_stub_server(|cfg: &mut web::ServiceConfig| {
            cfg.service(web::resource("/user/repos").route(web::get().to(|| async {
                HttpResponse::Ok().json(serde_json::json!([
                    {
                        "id": 2002,
                        "name": "widget",
                        "full_name": "octocat/widget",
                        "description": null,
                        "html_url": "https://github.com/octocat/widget"
                    },
                    {
                        "id": 2003,
                        "name": "gadget",
                        "full_name": "octocat/gadget",
                        "description": "spare parts",
                        "html_url": "https://github.com/octocat/gadget"
                    }
                ]))
            })));
        })
        .await;

        let second = {
            let mut r = repository_model(Uuid::new_v4(), owner);
            r.github_id = 2003;
            r.name = "gadget".to_string();
            r.full_name = "octocat/gadget".to_string();
            r
        };
        let persisted = vec![second, repository_model(Uuid::new_v4(), owner)];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<repository::Model>::new(), persisted])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();
        let github = GitHubClient::new(github_settings(&base_url));

        let listed = list_or_mirror(&db, &github, &user).await.unwrap();
        assert_eq!(listed.len(), 2);

        // SELECT (empty), single batched INSERT, re-SELECT of the new rows.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
        let dump = format!("{:?}", log);
        assert_eq!(dump.matches("INSERT").count(), 1);
        assert!(dump.contains("octocat/widget"));
        assert!(dump.contains("octocat/gadget"));
    }

    #[actix_rt::test]
    async fn test_foreign_repository_activation_leaves_row_unchanged() {
        let repo_id = Uuid::new_v4();
        let foreign = repository_model(repo_id, Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![foreign]])
            .into_connection();

        let err = set_repository_active(&db, repo_id, Uuid::new_v4(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Ownership(_)));

        // Only the ownership lookup ran; is_active was never written.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(!format!("{:?}", log).contains("UPDATE"));
    }

    #[actix_rt::test]
    async fn test_missing_repository_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<repository::Model>::new()])
            .into_connection();

        let err = find_owned_repository(&db, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
