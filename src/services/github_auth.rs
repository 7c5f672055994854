//! GitHub OAuth routes.
//!
//! Endpoints:
//! 1. GET /auth/github/login — Redirect to GitHub (with CSRF `state`)
//! 2. GET /auth/github/callback — Verify state, exchange code, upsert the
//!    local user, redirect to the frontend with the session token
//! 3. GET /auth/github/user — Return current user from the session token

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::{info, warn};

use crate::auth::{SessionAuth, create_session_token};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::UserResponse;
use crate::services::GitHubClient;

/// OAuth CSRF state cookie — stores the random `state` parameter
/// sent to GitHub, verified on callback to prevent login CSRF.
const OAUTH_STATE_COOKIE: &str = "cds_oauth_state";

/// OAuth scope requested on login: email plus repository read/write.
const OAUTH_SCOPE: &str = "user:email,repo";

/// Configure OAuth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(github_login)
        .service(github_callback)
        .service(get_authenticated_user);
}

/// Generate a cryptographically random string.
fn generate_random_hex() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

#[derive(serde::Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Redirect to GitHub OAuth authorization page.
///
/// GET /auth/github/login
#[utoipa::path(
    get,
    path = "/auth/github/login",
    tag = "Auth",
    responses(
        (status = 302, description = "Redirect to GitHub authorization page"),
    )
)]
#[get("/auth/github/login")]
pub async fn github_login(config: web::Data<Config>) -> AppResult<HttpResponse> {
    let state = generate_random_hex();

    let authorize_url = format!(
        "{}/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}&state={}",
        config.github.oauth_base_url,
        config.github.client_id,
        urlencoding::encode(&config.github.redirect_uri),
        urlencoding::encode(OAUTH_SCOPE),
        urlencoding::encode(&state),
    );

    let mut state_cookie = Cookie::new(OAUTH_STATE_COOKIE, state);
    state_cookie.set_path("/");
    state_cookie.set_http_only(true);
    state_cookie.set_same_site(SameSite::Lax);
    state_cookie.set_secure(config.environment.is_production());

    Ok(HttpResponse::Found()
        .cookie(state_cookie)
        .append_header(("Location", authorize_url))
        .finish())
}

/// Handle GitHub OAuth callback.
///
/// Exchanges the code, fetches the identity, upserts the local user (the
/// sole place a new user row is created), signs a session token, and
/// redirects to the frontend with the token as a query parameter.
///
/// GET /auth/github/callback?code=...&state=...
#[utoipa::path(
    get,
    path = "/auth/github/callback",
    tag = "Auth",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from GitHub"),
        ("state" = Option<String>, Query, description = "CSRF state parameter")
    ),
    responses(
        (status = 302, description = "Redirect to frontend with session token"),
        (status = 401, description = "Code missing or exchange failed", body = crate::error::ErrorResponse),
    )
)]
#[get("/auth/github/callback")]
pub async fn github_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    config: web::Data<Config>,
    github: web::Data<GitHubClient>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let code = query.code.as_deref().filter(|c| !c.is_empty()).ok_or_else(|| {
        AppError::Unauthorized("No authorization code provided".to_string())
    })?;

    // --- CSRF state verification ---
    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            warn!("OAuth callback: missing state cookie");
            AppError::Unauthorized("OAuth state verification failed".to_string())
        })?;

    let provided_state = query.state.as_deref().unwrap_or("");
    if provided_state.is_empty() || provided_state != expected_state {
        warn!("OAuth callback: state mismatch");
        return Err(AppError::Unauthorized(
            "OAuth state verification failed".to_string(),
        ));
    }

    // --- Exchange code, fetch identity ---
    let access_token = github.exchange_code(code).await?;
    let user_info = github.fetch_user(&access_token).await?;

    // --- Upsert user, storing the latest access token ---
    let user = crate::db::users::upsert_from_github(
        pool.connection(),
        user_info.id,
        &user_info.login,
        user_info.email.as_deref(),
        user_info.avatar_url.as_deref(),
        &access_token,
    )
    .await?;

    info!(
        "GitHub OAuth login: user='{}' (id={})",
        user.username, user.id
    );

    let session_token = create_session_token(
        user.id,
        &user.username,
        &config.session.secret,
        config.session.ttl_secs,
    )?;

    // Clear state cookie
    let mut clear_state = Cookie::new(OAUTH_STATE_COOKIE, "");
    clear_state.set_path("/");
    clear_state.set_http_only(true);
    clear_state.set_same_site(SameSite::Lax);
    clear_state.set_secure(config.environment.is_production());

    let redirect_url = format!(
        "{}/login?token={}",
        config.frontend_url,
        urlencoding::encode(&session_token)
    );

    Ok(HttpResponse::Found()
        .cookie(clear_state)
        .append_header(("Location", redirect_url))
        .finish())
}

/// Get the authenticated user for the presented session token.
///
/// GET /auth/github/user
#[utoipa::path(
    get,
    path = "/auth/github/user",
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated user", body = crate::models::UserResponse),
        (status = 401, description = "Missing or invalid session token", body = crate::error::ErrorResponse),
        (status = 404, description = "User no longer exists", body = crate::error::ErrorResponse),
    ),
    security(
        ("session_token" = [])
    )
)]
#[get("/auth/github/user")]
pub async fn get_authenticated_user(
    session: SessionAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let user = crate::db::users::find_by_id(pool.connection(), session.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", session.user_id)))?;

    let response: UserResponse = user.into();
    Ok(HttpResponse::Ok().json(response))
}
