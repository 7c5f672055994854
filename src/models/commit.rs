//! Commit and article models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{commit, repository};

use super::RepositoryResponse;

/// Commit list item as returned by the GitHub commit-listing endpoint.
#[derive(Debug, Deserialize)]
pub struct GitHubCommitItem {
    pub sha: String,
    pub commit: GitHubCommitDetail,
}

/// Nested `commit` object of a GitHub commit list item.
#[derive(Debug, Deserialize)]
pub struct GitHubCommitDetail {
    pub message: String,
    pub author: Option<GitHubCommitAuthor>,
}

/// Author block of a GitHub commit.
#[derive(Debug, Deserialize)]
pub struct GitHubCommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Fields staged for insertion when mirroring a fetched commit.
#[derive(Debug, Clone)]
pub struct NewCommit {
    pub sha: String,
    pub message: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_date: DateTime<Utc>,
}

impl From<GitHubCommitItem> for NewCommit {
    fn from(item: GitHubCommitItem) -> Self {
        let author = item.commit.author;
        let (author_name, author_email, author_date) = match author {
            Some(a) => (a.name, a.email, a.date.unwrap_or_else(Utc::now)),
            None => (None, None, Utc::now()),
        };

        Self {
            sha: item.sha,
            message: item.commit.message,
            author_name,
            author_email,
            author_date,
        }
    }
}

/// Document type selecting which prompt template governs article generation.
/// Unrecognized tags fall back to [`DocType::Article`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Article,
    Api,
    Faq,
    Slides,
    Video,
    Release,
}

impl DocType {
    /// Parse a docType tag, defaulting to `Article` for unrecognized values.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "api" => Self::Api,
            "faq" => Self::Faq,
            "slides" => Self::Slides,
            "video" => Self::Video,
            "release" => Self::Release,
            _ => Self::Article,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Api => "api",
            Self::Faq => "faq",
            Self::Slides => "slides",
            Self::Video => "video",
            Self::Release => "release",
        }
    }
}

impl Default for DocType {
    fn default() -> Self {
        Self::Article
    }
}

/// Request body for POST /commits/{id}/generate-article.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArticleRequest {
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub force_regenerate: bool,
}

/// Request body for PUT /commits/{id}/update-article.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub article_content: String,
}

/// Commit response body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub id: Uuid,
    pub sha: String,
    pub message: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_date: DateTime<Utc>,
    pub repository_id: Uuid,
    pub article_content: Option<String>,
    pub article_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<commit::Model> for CommitResponse {
    fn from(c: commit::Model) -> Self {
        Self {
            id: c.id,
            sha: c.sha,
            message: c.message,
            author_name: c.author_name,
            author_email: c.author_email,
            author_date: c.author_date,
            repository_id: c.repository_id,
            article_content: c.article_content,
            article_generated: c.article_generated,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Generated article with its owning repository eager-loaded.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    #[serde(flatten)]
    pub commit: CommitResponse,
    pub repository: RepositoryResponse,
}

impl From<(commit::Model, repository::Model)> for ArticleResponse {
    fn from((c, r): (commit::Model, repository::Model)) -> Self {
        Self {
            commit: c.into(),
            repository: r.into(),
        }
    }
}
