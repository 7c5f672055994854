//! Actix-web extractor for session-token authentication.
//!
//! Guarded routes take a [`SessionAuth`] argument; extraction fails with a
//! 401 response when the bearer token is missing, malformed, or invalid.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::auth::verify_session_token;
use crate::config::Config;
use crate::error::ErrorResponse;

/// Authentication error for the session extractor.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extract the bearer token from the Authorization header.
fn extract_bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor that requires a valid session token.
///
/// Use this in handlers that require authentication:
/// ```ignore
/// async fn protected_handler(session: SessionAuth) -> impl Responder {
///     // session.user_id is the authenticated local user id
/// }
/// ```
pub struct SessionAuth {
    pub user_id: Uuid,
    pub username: String,
}

impl FromRequest for SessionAuth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let config = match req.app_data::<web::Data<Config>>() {
            Some(config) => config,
            None => {
                return ready(Err(AuthError {
                    message: "Internal configuration error".to_string(),
                }));
            }
        };

        let token = match extract_bearer_token(req) {
            Some(token) => token,
            None => {
                return ready(Err(AuthError {
                    message: "Missing session token. Provide an Authorization: Bearer header."
                        .to_string(),
                }));
            }
        };

        match verify_session_token(token, &config.session.secret) {
            Ok(claims) => ready(Ok(SessionAuth {
                user_id: claims.user_id,
                username: claims.username,
            })),
            Err(e) => ready(Err(AuthError {
                message: e.to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_bearer_token() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_token_missing_or_malformed() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(extract_bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer "))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), None);
    }
}
