//! Signed OAuth `state` tokens for the login round trip

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::constants::OAUTH_STATE_TTL_SECS;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("OAuth state has expired")]
    Expired,
    #[error("Invalid OAuth state: {0}")]
    Invalid(String),
    #[error("Failed to sign OAuth state: {0}")]
    Signing(String),
}

/// Claims carried by the `state` parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateClaims {
    /// Random nonce; the state is single use only because the callback clears its cookie
    pub jti: String,
    /// Local path to land on after login
    pub return_to: String,
    pub iat: i64,
    pub exp: i64,
}

impl StateClaims {
    pub fn new(return_to: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            jti: Uuid::new_v4().to_string(),
            return_to: sanitize_return_to(return_to),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(OAUTH_STATE_TTL_SECS)).timestamp(),
        }
    }
}

/// Only same-origin paths are accepted as redirect targets.
///
/// Browsers drop tab, CR and LF from a `Location` value, so any control
/// character (raw or percent-encoded) could turn `/\t/host` into `//host`.
pub fn sanitize_return_to(return_to: Option<&str>) -> String {
    match return_to {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(|c| c.is_control())
                && !has_encoded_control(path) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// True when a `%XX` escape decodes to an ASCII control byte
fn has_encoded_control(path: &str) -> bool {
    path.as_bytes().windows(3).any(|w| match w {
        [b'%', hi, lo] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
            let byte = (hex_value(*hi) << 4) | hex_value(*lo);
            byte.is_ascii_control()
        }
        _ => false,
    })
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Create a signed state token
pub fn create_state_token(signing_key: &[u8], return_to: Option<&str>) -> Result<String, StateError> {
    let claims = StateClaims::new(return_to);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| StateError::Signing(e.to_string()))
}

/// Validate and decode a state token
pub fn validate_state_token(token: &str, signing_key: &[u8]) -> Result<StateClaims, StateError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<StateClaims>(token, &DecodingKey::from_secret(signing_key), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => StateError::Expired,
            _ => StateError::Invalid(e.to_string()),
        })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> Vec<u8> {
        vec![7u8; 32]
    }

    #[test]
    fn test_create_and_validate() {
        let key = test_key();
        let token = create_state_token(&key, Some("/journal")).unwrap();
        let claims = validate_state_token(&token, &key).unwrap();
        assert_eq!(claims.return_to, "/journal");
        assert_eq!(claims.exp - claims.iat, OAUTH_STATE_TTL_SECS);
    }

    #[test]
    fn test_nonces_are_unique() {
        let a = StateClaims::new(None);
        let b = StateClaims::new(None);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = create_state_token(&test_key(), None).unwrap();
        let result = validate_state_token(&token, &[1u8; 32]);
        assert!(matches!(result, Err(StateError::Invalid(_))));
    }

    #[test]
    fn test_expired_state_rejected() {
        let key = test_key();
        let now = Utc::now().timestamp();
        let claims = StateClaims {
            jti: "nonce".to_string(),
            return_to: "/".to_string(),
            iat: now - 1200,
            exp: now - 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&key),
        )
        .unwrap();
        assert!(matches!(
            validate_state_token(&token, &key),
            Err(StateError::Expired)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(validate_state_token("not-a-jwt", &test_key()).is_err());
    }

    #[test]
    fn test_sanitize_return_to() {
        assert_eq!(sanitize_return_to(Some("/moods?day=1")), "/moods?day=1");
        assert_eq!(sanitize_return_to(Some("https://evil.example")), "/");
        assert_eq!(sanitize_return_to(Some("//evil.example")), "/");
        assert_eq!(sanitize_return_to(Some("/\\evil.example")), "/");
        assert_eq!(sanitize_return_to(None), "/");
    }

    #[test]
    fn test_sanitize_return_to_rejects_control_characters() {
        assert_eq!(sanitize_return_to(Some("/\t/evil.example")), "/");
        assert_eq!(sanitize_return_to(Some("/\n/evil.example")), "/");
        assert_eq!(sanitize_return_to(Some("/\r\n/evil.example")), "/");
        assert_eq!(sanitize_return_to(Some("/%09/evil.example")), "/");
        assert_eq!(sanitize_return_to(Some("/%0d%0A/evil.example")), "/");
        assert_eq!(sanitize_return_to(Some("/%7f/evil.example")), "/");
        // Ordinary escapes are kept
        assert_eq!(
            sanitize_return_to(Some("/search?q=a%20b%2F")),
            "/search?q=a%20b%2F"
        );
    }
}
