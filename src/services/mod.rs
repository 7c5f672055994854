//! Business logic services.

pub mod articles;
pub mod gemini;
pub mod github;
pub mod github_auth;

pub use gemini::GeminiClient;
pub use github::GitHubClient;
pub use github_auth::configure_routes as configure_auth_routes;
