//! Repository models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::repository;

/// Repository as returned by the GitHub repository-listing endpoint.
#[derive(Debug, Deserialize)]
pub struct GitHubRepo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
}

/// Fields staged for insertion when mirroring a fetched repository.
#[derive(Debug, Clone)]
pub struct NewRepository {
    pub github_id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
}

impl From<GitHubRepo> for NewRepository {
    fn from(r: GitHubRepo) -> Self {
        Self {
            github_id: r.id,
            name: r.name,
            full_name: r.full_name,
            description: r.description,
            url: r.html_url,
        }
    }
}

/// Repository response body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryResponse {
    pub id: Uuid,
    pub github_id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub owner_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<repository::Model> for RepositoryResponse {
    fn from(r: repository::Model) -> Self {
        Self {
            id: r.id,
            github_id: r.github_id,
            name: r.name,
            full_name: r.full_name,
            description: r.description,
            url: r.url,
            owner_id: r.owner_id,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
