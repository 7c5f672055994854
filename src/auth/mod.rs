//! Session token issuing and verification.
//!
//! Session tokens are HS256 JWTs carrying the local user id and username,
//! issued after GitHub OAuth completes and presented as a bearer token on
//! every guarded route.

pub mod extractor;

pub use extractor::SessionAuth;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::SessionClaims;

/// Session JWT issuer.
pub const SESSION_ISSUER: &str = "commit-docs";

/// Create a signed session token for a user.
pub fn create_session_token(
    user_id: Uuid,
    username: &str,
    secret: &SecretString,
    ttl_secs: u64,
) -> AppResult<String> {
    let now = chrono::Utc::now();
    let exp = now + chrono::Duration::seconds(ttl_secs as i64);

    let claims = SessionClaims {
        sub: user_id.to_string(),
        iss: SESSION_ISSUER.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
        user_id,
        username: username.to_string(),
    };

    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Unauthorized(format!("Failed to create session token: {}", e)))
}

/// Verify a session token and return its claims.
pub fn verify_session_token(token: &str, secret: &SecretString) -> AppResult<SessionClaims> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_aud = false;

    let token_data = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|e| AppError::Unauthorized(format!("Invalid session token: {}", e)))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let secret = SecretString::from("test-secret");
        let user_id = Uuid::new_v4();

        let token = create_session_token(user_id, "octocat", &secret, 3600).unwrap();
        let claims = verify_session_token(&token, &secret).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.username, "octocat");
        assert_eq!(claims.iss, SESSION_ISSUER);
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let secret = SecretString::from("test-secret");
        let other = SecretString::from("other-secret");
        let token = create_session_token(Uuid::new_v4(), "octocat", &secret, 3600).unwrap();

        assert!(matches!(
            verify_session_token(&token, &other),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_token_maps_to_unauthorized() {
        let secret = SecretString::from("test-secret");

        assert!(matches!(
            verify_session_token("not-a-jwt", &secret),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = SecretString::from("test-secret");
        let token = create_session_token(Uuid::new_v4(), "octocat", &secret, 0).unwrap();

        // exp == iat; jsonwebtoken's default leeway is 60s, so pin leeway to 0
        let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.leeway = 0;
        validation.validate_aud = false;

        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(decode::<crate::models::SessionClaims>(&token, &key, &validation).is_err());
    }
}
