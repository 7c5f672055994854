//! API endpoint modules.

pub mod commits;
pub mod health;
pub mod openapi;
pub mod repositories;

pub use commits::configure_routes as configure_commit_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use repositories::configure_routes as configure_repository_routes;
