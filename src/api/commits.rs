//! Commit and article API handlers.
//!
//! Commit listing uses the same fetch-if-empty policy as repositories.
//! Article generation and editing live in `services::articles`.

use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::{self, DbPool};
use crate::entity::{commit, repository};
use crate::error::{AppError, AppResult};
use crate::models::{
    ArticleResponse, CommitResponse, DocType, GenerateArticleRequest, NewCommit,
    UpdateArticleRequest,
};
use crate::services::{GeminiClient, GitHubClient, articles};

fn to_response(commits: Vec<commit::Model>) -> Vec<CommitResponse> {
    commits.into_iter().map(CommitResponse::from).collect()
}

/// Return a repository's stored commits, mirroring one page from GitHub
/// first when none are stored yet. A populated mirror makes no provider call.
async fn list_or_mirror(
    db: &DatabaseConnection,
    github: &GitHubClient,
    repository: &repository::Model,
) -> AppResult<Vec<commit::Model>> {
    let existing = db::commits::find_by_repository(db, repository.id).await?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    let user = db::users::find_by_id(db, repository.owner_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    let access_token = user.access_token.ok_or_else(|| {
        AppError::Unauthorized("No GitHub access token stored for user".to_string())
    })?;

    // Persistence happens only after the full response is obtained.
    let fetched = github
        .list_commits(&repository.full_name, &access_token)
        .await?;
    let new_commits: Vec<NewCommit> = fetched.into_iter().map(NewCommit::from).collect();
    let persisted = db::commits::insert_many(db, repository.id, new_commits).await?;

    info!(
        "Mirrored {} commits for repository '{}'",
        persisted.len(),
        repository.full_name
    );

    Ok(persisted)
}

/// List a repository's commits, fetching from GitHub on first access.
#[utoipa::path(
    get,
    path = "/commits/repository/{repository_id}",
    tag = "Commits",
    params(
        ("repository_id" = Uuid, Path, description = "Repository UUID")
    ),
    responses(
        (status = 200, description = "Repository commits", body = [CommitResponse]),
        (status = 403, description = "Repository missing or not owned", body = crate::error::ErrorResponse),
        (status = 502, description = "GitHub fetch failed", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_repository_commits(
    session: SessionAuth,
    pool: web::Data<DbPool>,
    github: web::Data<GitHubClient>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let repository_id = path.into_inner();

    // A missing repository and a foreign one fail the same way.
    let repository = db::repositories::find_by_id(pool.connection(), repository_id)
        .await?
        .filter(|r| r.owner_id == session.user_id)
        .ok_or_else(|| {
            AppError::Ownership("Repository not found or not owned by user".to_string())
        })?;

    let commits = list_or_mirror(pool.connection(), github.get_ref(), &repository).await?;

    Ok(HttpResponse::Ok().json(to_response(commits)))
}

/// Get a single commit by ID.
#[utoipa::path(
    get,
    path = "/commits/{id}",
    tag = "Commits",
    params(
        ("id" = Uuid, Path, description = "Commit UUID")
    ),
    responses(
        (status = 200, description = "Commit details", body = CommitResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Commit not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_commit(
    session: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let (commit, repository) = db::commits::find_with_repository(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Commit {}", id)))?;

    if repository.owner_id != session.user_id {
        return Err(AppError::Ownership("Commit not owned by user".to_string()));
    }

    Ok(HttpResponse::Ok().json(CommitResponse::from(commit)))
}

/// Generate an article for a commit.
#[utoipa::path(
    post,
    path = "/commits/{id}/generate-article",
    tag = "Commits",
    params(
        ("id" = Uuid, Path, description = "Commit UUID")
    ),
    request_body = GenerateArticleRequest,
    responses(
        (status = 200, description = "Commit with generated article", body = CommitResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Commit not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Diff fetch failed", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn generate_article(
    session: SessionAuth,
    pool: web::Data<DbPool>,
    github: web::Data<GitHubClient>,
    gemini: web::Data<GeminiClient>,
    path: web::Path<Uuid>,
    body: web::Json<GenerateArticleRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let doc_type = req
        .doc_type
        .as_deref()
        .map(DocType::parse)
        .unwrap_or_default();

    let commit = articles::generate(
        pool.connection(),
        github.get_ref(),
        gemini.get_ref(),
        path.into_inner(),
        session.user_id,
        doc_type,
        req.force_regenerate,
    )
    .await?;

    Ok(HttpResponse::Ok().json(CommitResponse::from(commit)))
}

/// Overwrite the article content of a commit.
#[utoipa::path(
    put,
    path = "/commits/{id}/update-article",
    tag = "Commits",
    params(
        ("id" = Uuid, Path, description = "Commit UUID")
    ),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Commit with updated article", body = CommitResponse),
        (status = 400, description = "Article never generated", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Commit not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn update_article(
    session: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateArticleRequest>,
) -> AppResult<HttpResponse> {
    let commit = articles::update_content(
        pool.connection(),
        path.into_inner(),
        session.user_id,
        body.into_inner().article_content,
    )
    .await?;

    Ok(HttpResponse::Ok().json(CommitResponse::from(commit)))
}

/// List the caller's generated articles across all repositories.
#[utoipa::path(
    get,
    path = "/commits",
    tag = "Commits",
    responses(
        (status = 200, description = "Generated articles", body = [ArticleResponse]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_articles(
    session: SessionAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let rows = articles::list_generated(pool.connection(), session.user_id).await?;
    let response: Vec<ArticleResponse> = rows.into_iter().map(ArticleResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Configure commit routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/commits").route(web::get().to(list_articles)))
        .service(
            web::resource("/commits/repository/{repository_id}")
                .route(web::get().to(list_repository_commits)),
        )
        .service(web::resource("/commits/{id}").route(web::get().to(get_commit)))
        .service(
            web::resource("/commits/{id}/generate-article")
                .route(web::post().to(generate_article)),
        )
        .service(
            web::resource("/commits/{id}/update-article").route(web::put().to(update_article)),
        );
}
