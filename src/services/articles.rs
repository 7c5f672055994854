//! Article generation for commits.
//!
//! The generator fetches the commit's diff from GitHub, builds a prompt
//! selected by document type, submits it to Gemini, and stores the returned
//! text on the commit. When the model call fails, a deterministic templated
//! placeholder embedding the commit message and raw diff is stored instead,
//! and the commit is still marked generated. A failed diff fetch is not
//! covered by the fallback: the operation fails and the commit is untouched.

use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::entity::{commit, repository};
use crate::error::{AppError, AppResult};
use crate::models::DocType;
use crate::services::{GeminiClient, GitHubClient};

/// Build the generation prompt for a document type.
///
/// Each type maps to a distinct instruction template combining the commit
/// message and the diff text.
pub fn build_prompt(doc_type: DocType, commit_message: &str, diff: &str) -> String {
    let instructions = match doc_type {
        DocType::Api => {
            "Please generate comprehensive API documentation in Swagger/OpenAPI style that:\n\
             1. Has a clear title and description for each endpoint or component\n\
             2. Lists all parameters, request bodies, and response formats\n\
             3. Includes example requests and responses\n\
             4. Documents any authentication requirements\n\
             5. Uses markdown formatting for better readability\n\n\
             Format the documentation with proper markdown headings, code blocks, and sections."
        }
        DocType::Faq => {
            "Please generate a comprehensive FAQ document that:\n\
             1. Anticipates common questions users might have about this change\n\
             2. Provides clear, concise answers to each question\n\
             3. Covers both basic and advanced usage scenarios\n\
             4. Includes troubleshooting questions and solutions\n\
             5. Uses markdown formatting for better readability\n\n\
             Format the FAQ with proper markdown headings and sections."
        }
        DocType::Slides => {
            "Please generate content for a technical presentation that:\n\
             1. Has a clear title slide and agenda\n\
             2. Explains the purpose and context of the changes\n\
             3. Highlights key technical details with code snippets\n\
             4. Includes bullet points for easy presentation\n\
             5. Ends with a summary and next steps\n\n\
             Format the content as a series of slides using markdown, with clear slide breaks and titles."
        }
        DocType::Video => {
            "Please generate a comprehensive video script that:\n\
             1. Has a clear introduction explaining the purpose of the changes\n\
             2. Walks through the code changes in a logical order\n\
             3. Explains technical concepts in an accessible way\n\
             4. Includes cues for when to show code on screen\n\
             5. Ends with a summary and call to action\n\n\
             Format the script with clear sections for introduction, main content, and conclusion."
        }
        DocType::Release => {
            "Please generate comprehensive release notes that:\n\
             1. Summarize the changes in a clear, concise manner\n\
             2. List new features, improvements, and bug fixes\n\
             3. Include any breaking changes and migration instructions\n\
             4. Mention any dependencies that were added or updated\n\
             5. Uses markdown formatting for better readability\n\n\
             Format the release notes with proper markdown headings, bullet points, and sections."
        }
        DocType::Article => {
            "Please generate a comprehensive how-to article that:\n\
             1. Has a clear title based on the commit message\n\
             2. Explains what the code changes do in a clear, concise manner\n\
             3. Provides step-by-step instructions on how to use the feature or fix that was implemented\n\
             4. Includes code examples where appropriate\n\
             5. Uses markdown formatting for better readability\n\n\
             Format the article with proper markdown headings, code blocks, and sections."
        }
    };

    let role = match doc_type {
        DocType::Api => "API documentation",
        DocType::Faq => "a FAQ document",
        DocType::Slides => "presentation slide content",
        DocType::Video => "a video script",
        DocType::Release => "release notes",
        DocType::Article => "a how-to article",
    };

    format!(
        "You are a technical writer creating {} based on a Git commit.\n\n\
         Commit Message: {}\n\n\
         Code Changes:\n```diff\n{}\n```\n\n{}",
        role, commit_message, diff, instructions
    )
}

/// Deterministic placeholder stored when the model call fails.
pub fn fallback_article(commit_message: &str, diff: &str) -> String {
    format!(
        "# How-to Article: {}\n\n\
         This article explains the changes made in this commit.\n\n\
         ## Code Changes\n\n\
         ```diff\n{}\n```\n\n\
         ## Explanation\n\n\
         [Error generating AI explanation. Please try again later.]",
        commit_message, diff
    )
}

/// Resolve a model result into article text, absorbing failures into the
/// fallback template. This is the one place an upstream failure is converted
/// into a successful result.
pub fn article_or_fallback(
    result: AppResult<String>,
    commit_message: &str,
    diff: &str,
) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            warn!("Article generation fell back to template: {}", e);
            fallback_article(commit_message, diff)
        }
    }
}

/// Load a commit with its repository and verify the caller owns it.
async fn find_owned_commit(
    db: &DatabaseConnection,
    commit_id: Uuid,
    user_id: Uuid,
) -> AppResult<(commit::Model, repository::Model)> {
    let (commit, repository) = db::commits::find_with_repository(db, commit_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Commit {}", commit_id)))?;

    if repository.owner_id != user_id {
        return Err(AppError::Ownership(
            "Commit not owned by user".to_string(),
        ));
    }

    Ok((commit, repository))
}

/// Generate (or regenerate) the article for a commit.
///
/// Idempotent short-circuit: an already-generated commit is returned
/// unchanged unless `force_regenerate` is set.
pub async fn generate(
    db: &DatabaseConnection,
    github: &GitHubClient,
    gemini: &GeminiClient,
    commit_id: Uuid,
    user_id: Uuid,
    doc_type: DocType,
    force_regenerate: bool,
) -> AppResult<commit::Model> {
    let (commit, repository) = find_owned_commit(db, commit_id, user_id).await?;

    if commit.article_generated && !force_regenerate {
        return Ok(commit);
    }

    let user = db::users::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    let access_token = user.access_token.ok_or_else(|| {
        AppError::Unauthorized("No GitHub access token stored for user".to_string())
    })?;

    // Diff failures propagate; the fallback only covers the model call.
    let diff = github
        .fetch_commit_diff(&repository.full_name, &commit.sha, &access_token)
        .await?;

    let prompt = build_prompt(doc_type, &commit.message, &diff);
    let content = article_or_fallback(gemini.generate(&prompt).await, &commit.message, &diff);

    let updated = db::commits::set_article(db, commit_id, content).await?;

    info!(
        "Article generated: commit={} sha={} doc_type={}",
        commit_id,
        updated.sha,
        doc_type.as_str()
    );

    Ok(updated)
}

/// Overwrite the article content of a commit that has already been generated.
pub async fn update_content(
    db: &DatabaseConnection,
    commit_id: Uuid,
    user_id: Uuid,
    content: String,
) -> AppResult<commit::Model> {
    let (commit, _repository) = find_owned_commit(db, commit_id, user_id).await?;

    if !commit.article_generated {
        return Err(AppError::InvalidInput(
            "No article has been generated for this commit yet".to_string(),
        ));
    }

    db::commits::update_article_content(db, commit_id, content).await
}

/// List every generated article across the user's repositories, each with
/// its owning repository.
pub async fn list_generated(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<(commit::Model, repository::Model)>> {
    db::commits::list_generated_for_owner(db, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{HttpResponse, web};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::test_support::{
        UNREACHABLE_BASE_URL, commit_model, gemini_settings, github_settings, repository_model,
        spawn_stub_server, user_model,
    };

    const DIFF: &str = "--- a/x\n+++ b/x";

    #[test]
    fn test_prompt_embeds_message_and_diff() {
        for doc_type in [
            DocType::Article,
            DocType::Api,
            DocType::Faq,
            DocType::Slides,
            DocType::Video,
            DocType::Release,
        ] {
            let prompt = build_prompt(doc_type, "fix bug", DIFF);
            assert!(prompt.contains("Commit Message: fix bug"));
            assert!(prompt.contains(DIFF));
            assert!(prompt.starts_with("You are a technical writer"));
        }
    }

    #[test]
    fn test_prompts_are_distinct_per_doc_type() {
        let prompts: Vec<String> = [
            DocType::Article,
            DocType::Api,
            DocType::Faq,
            DocType::Slides,
            DocType::Video,
            DocType::Release,
        ]
        .iter()
        .map(|t| build_prompt(*t, "fix bug", DIFF))
        .collect();

        for (i, a) in prompts.iter().enumerate() {
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }

        assert!(build_prompt(DocType::Api, "m", "d").contains("Swagger/OpenAPI"));
        assert!(build_prompt(DocType::Faq, "m", "d").contains("FAQ"));
        assert!(build_prompt(DocType::Release, "m", "d").contains("release notes"));
    }

    #[test]
    fn test_fallback_template_shape() {
        let article = fallback_article("fix bug", DIFF);
        assert!(article.starts_with("# How-to Article: fix bug"));
        assert!(article.contains(DIFF));
        assert!(article.contains("[Error generating AI explanation. Please try again later.]"));
    }

    #[test]
    fn test_article_or_fallback_passes_through_success() {
        let text = article_or_fallback(Ok("generated text".to_string()), "fix bug", DIFF);
        assert_eq!(text, "generated text");
    }

    #[test]
    fn test_article_or_fallback_absorbs_model_failure() {
        let text = article_or_fallback(
            Err(AppError::Upstream("Gemini returned 500".to_string())),
            "fix bug",
            DIFF,
        );
        assert!(text.starts_with("# How-to Article: fix bug"));
        assert!(text.contains(DIFF));
    }

    #[actix_rt::test]
    async fn test_generate_short_circuits_when_already_generated() {
        let owner = Uuid::new_v4();
        let repo = repository_model(Uuid::new_v4(), owner);
        let commit = commit_model(Uuid::new_v4(), repo.id, true);
        let commit_id = commit.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(commit, repo)]])
            .into_connection();
        // Neither client may be reached on this path.
        let github = GitHubClient::new(github_settings(UNREACHABLE_BASE_URL));
        let gemini = GeminiClient::new(gemini_settings(UNREACHABLE_BASE_URL, Some("test-key")));

        let result = generate(&db, &github, &gemini, commit_id, owner, DocType::Article, false)
            .await
            .unwrap();
        assert!(result.article_generated);
        assert_eq!(result.article_content.as_deref(), Some("existing article"));

        // Only the ownership lookup ran.
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[actix_rt::test]
    async fn test_failed_diff_fetch_leaves_commit_untouched() {
        let owner = Uuid::new_v4();
        let repo = repository_model(Uuid::new_v4(), owner);
        let commit = commit_model(Uuid::new_v4(), repo.id, false);
        let commit_id = commit.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(commit, repo)]])
            .append_query_results([vec![user_model(owner, Some("gh-token"))]])
            .into_connection();
        let github = GitHubClient::new(github_settings(UNREACHABLE_BASE_URL));
        let gemini = GeminiClient::new(gemini_settings(UNREACHABLE_BASE_URL, Some("test-key")));

        let err = generate(&db, &github, &gemini, commit_id, owner, DocType::Article, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));

        // Commit and user SELECTs only; nothing was written.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(!format!("{:?}", log).contains("UPDATE"));
    }

    #[actix_rt::test]
    async fn test_force_regenerate_overwrites_with_fallback_when_model_unavailable() {
        let owner = Uuid::new_v4();
        let repo = repository_model(Uuid::new_v4(), owner);
        let commit = commit_model(Uuid::new_v4(), repo.id, true);
        let commit_id = commit.id;
        let repo_id = repo.id;

        let base_url = spawn_stub_server(|cfg: &mut web::ServiceConfig| {
            cfg.service(
                web::resource("/repos/{owner}/{name}/commits/{sha}")
                    .route(web::get().to(|| async { HttpResponse::Ok().body(DIFF) })),
            );
        })
        .await;

        let fallback = fallback_article("fix bug", DIFF);
        let updated = {
            let mut c = commit_model(commit_id, repo_id, true);
            c.article_content = Some(fallback.clone());
            c
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(commit, repo)]])
            .append_query_results([vec![user_model(owner, Some("gh-token"))]])
            .append_query_results([vec![commit_model(commit_id, repo_id, true)]])
            .append_query_results([vec![updated]])
            .into_connection();
        let github = GitHubClient::new(github_settings(&base_url));
        // No API key: the model call fails and the fallback template is stored.
        let gemini = GeminiClient::new(gemini_settings(UNREACHABLE_BASE_URL, None));

        let result = generate(&db, &github, &gemini, commit_id, owner, DocType::Article, true)
            .await
            .unwrap();
        assert!(result.article_generated);
        assert_eq!(result.article_content.as_deref(), Some(fallback.as_str()));

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 4);
        let dump = format!("{:?}", log);
        assert!(dump.contains("How-to Article: fix bug"));
        assert!(dump.contains("--- a/x"));
    }

    #[actix_rt::test]
    async fn test_update_content_rejected_before_first_generation() {
        let owner = Uuid::new_v4();
        let repo = repository_model(Uuid::new_v4(), owner);
        let commit = commit_model(Uuid::new_v4(), repo.id, false);
        let commit_id = commit.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(commit, repo)]])
            .into_connection();

        let err = update_content(&db, commit_id, owner, "edited".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[actix_rt::test]
    async fn test_update_content_overwrites_article_in_place() {
        let owner = Uuid::new_v4();
        let repo = repository_model(Uuid::new_v4(), owner);
        let commit = commit_model(Uuid::new_v4(), repo.id, true);
        let commit_id = commit.id;
        let repo_id = repo.id;

        let updated = {
            let mut c = commit_model(commit_id, repo_id, true);
            c.article_content = Some("new text".to_string());
            c
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(commit, repo)]])
            .append_query_results([vec![commit_model(commit_id, repo_id, true)]])
            .append_query_results([vec![updated]])
            .into_connection();

        let result = update_content(&db, commit_id, owner, "new text".to_string())
            .await
            .unwrap();
        assert!(result.article_generated);
        assert_eq!(result.article_content.as_deref(), Some("new text"));

        // The UPDATE binds the content string only; no boolean is written,
        // so the generated flag stays as it was.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
        let update_stmt = format!("{:?}", log[2]);
        assert!(update_stmt.contains("new text"));
        assert!(!update_stmt.contains("Bool("));
    }
}
