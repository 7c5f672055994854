//! GitHub API client.
//!
//! Covers the provider calls the server makes: OAuth code exchange, identity
//! fetch, repository and commit listing, and commit diff fetch. All endpoints
//! run against configurable base URLs so development and tests can point at
//! stand-in servers.

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::warn;

use crate::config::GitHubSettings;
use crate::error::{AppError, AppResult};
use crate::models::{GitHubCommitItem, GitHubRepo, GitHubUserInfo};

/// User-Agent sent on every GitHub API call (GitHub rejects requests without one).
const USER_AGENT: &str = "commit-docs";

/// HTTP connect timeout for GitHub API calls.
const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// HTTP total timeout for GitHub API calls.
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Fixed page size for repository listing (sorted by most-recently-updated).
const REPO_PAGE_SIZE: u32 = 100;
/// Fixed page size for commit listing.
const COMMIT_PAGE_SIZE: u32 = 100;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// Client for the GitHub OAuth and REST endpoints.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    settings: GitHubSettings,
}

impl GitHubClient {
    pub fn new(settings: GitHubSettings) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client for GitHub");

        Self { http, settings }
    }

    /// Exchange an OAuth authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let url = format!("{}/login/oauth/access_token", self.settings.oauth_base_url);

        let token_response: TokenResponse = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "client_id": self.settings.client_id,
                "client_secret": self.settings.client_secret.expose_secret(),
                "code": code,
            }))
            .send()
            .await
            .map_err(|e| {
                warn!("OAuth: failed to exchange code: {}", e);
                AppError::Unauthorized("GitHub authentication failed".to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                warn!("OAuth: failed to parse token response: {}", e);
                AppError::Unauthorized("GitHub authentication failed".to_string())
            })?;

        if let Some(ref err) = token_response.error {
            warn!("OAuth: GitHub returned error: {}", err);
            return Err(AppError::Unauthorized(
                "GitHub authentication failed".to_string(),
            ));
        }

        token_response.access_token.ok_or_else(|| {
            warn!("OAuth: no access_token in response");
            AppError::Unauthorized("GitHub authentication failed".to_string())
        })
    }

    /// Fetch the authenticated identity from the user-info endpoint.
    pub async fn fetch_user(&self, access_token: &str) -> AppResult<GitHubUserInfo> {
        let url = format!("{}/user", self.settings.api_base_url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("token {}", access_token))
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                warn!("OAuth: failed to fetch user info: {}", e);
                AppError::Unauthorized("GitHub authentication failed".to_string())
            })?;

        if !response.status().is_success() {
            warn!("OAuth: user-info endpoint returned {}", response.status());
            return Err(AppError::Unauthorized(
                "GitHub authentication failed".to_string(),
            ));
        }

        response.json().await.map_err(|e| {
            warn!("OAuth: failed to parse user info: {}", e);
            AppError::Unauthorized("GitHub authentication failed".to_string())
        })
    }

    /// List the user's repositories, most-recently-updated first, one fixed page.
    pub async fn list_repositories(&self, access_token: &str) -> AppResult<Vec<GitHubRepo>> {
        let url = format!(
            "{}/user/repos?sort=updated&per_page={}",
            self.settings.api_base_url, REPO_PAGE_SIZE
        );

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("token {}", access_token))
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                AppError::Upstream(format!("Failed to fetch repositories from GitHub: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "GitHub repository listing returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse repository listing: {}", e))
        })
    }

    /// List a repository's commits, one fixed page.
    /// `full_name` is the "owner/name" reported by GitHub.
    pub async fn list_commits(
        &self,
        full_name: &str,
        access_token: &str,
    ) -> AppResult<Vec<GitHubCommitItem>> {
        let url = format!(
            "{}/repos/{}/commits?per_page={}",
            self.settings.api_base_url, full_name, COMMIT_PAGE_SIZE
        );

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("token {}", access_token))
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                AppError::Upstream(format!("Failed to fetch commits from GitHub: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "GitHub commit listing returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse commit listing: {}", e)))
    }

    /// Fetch a commit's changes in diff format.
    pub async fn fetch_commit_diff(
        &self,
        full_name: &str,
        sha: &str,
        access_token: &str,
    ) -> AppResult<String> {
        let url = format!("{}/repos/{}/commits/{}", self.settings.api_base_url, full_name, sha);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("token {}", access_token))
            .header("Accept", "application/vnd.github.v3.diff")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to fetch commit diff: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "GitHub diff fetch returned {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read commit diff: {}", e)))
    }
}
