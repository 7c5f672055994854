//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Commit Docs Server",
        version = "0.1.0",
        description = "API server that mirrors GitHub repositories and commits and generates AI-assisted articles from commit diffs"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        services::github_auth::github_login,
        services::github_auth::github_callback,
        services::github_auth::get_authenticated_user,
        // Repository endpoints
        api::repositories::list_repositories,
        api::repositories::get_repository,
        api::repositories::activate_repository,
        api::repositories::deactivate_repository,
        // Commit endpoints
        api::commits::list_articles,
        api::commits::list_repository_commits,
        api::commits::get_commit,
        api::commits::generate_article,
        api::commits::update_article,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Users
            models::UserResponse,
            // Repositories
            models::RepositoryResponse,
            // Commits
            models::DocType,
            models::GenerateArticleRequest,
            models::UpdateArticleRequest,
            models::CommitResponse,
            models::ArticleResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "GitHub OAuth login and session"),
        (name = "Repositories", description = "Mirrored GitHub repositories"),
        (name = "Commits", description = "Mirrored commits and generated articles")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the bearer session token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
