//! Shared unit-test helpers: canned entity models, client settings, and an
//! in-process HTTP server standing in for GitHub and Gemini.

use actix_web::{App, HttpServer, web};
use chrono::Utc;
use secrecy::SecretString;
use uuid::Uuid;

use crate::config::{GeminiSettings, GitHubSettings};
use crate::entity::{commit, repository, user};

/// Base URL that refuses connections. Pointing a client here proves a code
/// path makes no HTTP call when it succeeds anyway.
pub(crate) const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9";

/// Start an in-process HTTP server on an ephemeral port and return its base
/// URL. The server lives for the rest of the process.
pub(crate) async fn spawn_stub_server<F>(configure: F) -> String
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let port = listener.local_addr().expect("no local addr").port();

    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

    // Fire and forget — server lives for the process lifetime
    tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

pub(crate) fn github_settings(base_url: &str) -> GitHubSettings {
    GitHubSettings {
        client_id: "test-client-id".to_string(),
        client_secret: SecretString::from("test-client-secret"),
        redirect_uri: "http://localhost:8080/auth/github/callback".to_string(),
        oauth_base_url: base_url.to_string(),
        api_base_url: base_url.to_string(),
    }
}

pub(crate) fn gemini_settings(base_url: &str, api_key: Option<&str>) -> GeminiSettings {
    GeminiSettings {
        api_key: api_key.map(SecretString::from),
        model: "gemini-2.0-flash".to_string(),
        api_base_url: base_url.to_string(),
    }
}

pub(crate) fn user_model(id: Uuid, access_token: Option<&str>) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        github_id: 1001,
        username: "octocat".to_string(),
        email: Some("octocat@example.com".to_string()),
        avatar_url: None,
        access_token: access_token.map(|t| t.to_string()),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn repository_model(id: Uuid, owner_id: Uuid) -> repository::Model {
    let now = Utc::now();
    repository::Model {
        id,
        github_id: 2002,
        name: "widget".to_string(),
        full_name: "octocat/widget".to_string(),
        description: None,
        url: "https://github.com/octocat/widget".to_string(),
        owner_id,
        is_active: false,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn commit_model(id: Uuid, repository_id: Uuid, article_generated: bool) -> commit::Model {
    let now = Utc::now();
    commit::Model {
        id,
        sha: "abc123".to_string(),
        message: "fix bug".to_string(),
        author_name: Some("Jane Doe".to_string()),
        author_email: None,
        author_date: now,
        repository_id,
        article_content: article_generated.then(|| "existing article".to_string()),
        article_generated,
        created_at: now,
        updated_at: now,
    }
}
