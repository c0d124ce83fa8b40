//! JWT Token Handler
//! Mission: Issue and verify short-lived session tokens

use crate::auth::models::{Claims, User, UserId};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use tracing::debug;

/// Default session lifetime: 10 minutes.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 600;

/// Longest session lifetime the server accepts: one day.
pub const MAX_TOKEN_TTL_SECS: i64 = 86_400;

/// Why a token was rejected. Callers collapse all of these into
/// "unauthenticated" before anything reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature invalid")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtHandler {
    /// Create a handler from the process-wide secret
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `verify`
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Mint a token for `user` with `exp = issued_at + ttl`.
    pub fn issue(&self, user: &User, issued_at: i64) -> Result<String> {
        let exp = issued_at
            .checked_add(self.ttl_secs)
            .context("Token expiry overflows")?;
        let claims = Claims {
            sub: user.id.to_string(),
            login_id: user.login_id.clone(),
            iat: issued_at,
            exp,
        };

        debug!(
            "Issuing JWT for user {} ({}), expires in {}s",
            user.login_id, user.id, self.ttl_secs
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")
    }

    pub fn issue_now(&self, user: &User) -> Result<String> {
        self.issue(user, Utc::now().timestamp())
    }

    /// Verify signature and expiry. Valid iff the signature checks out and
    /// `now < exp`.
    pub fn verify(&self, token: &str, now: i64) -> Result<UserId, TokenError> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            },
        )?;

        let claims = decoded.claims;
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        UserId::parse(&claims.sub).ok_or(TokenError::Malformed)
    }

    pub fn verify_now(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify(token, Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000;

    fn create_test_user() -> User {
        User {
            id: UserId::new(),
            login_id: "testuser".to_string(),
            full_name: "Test User".to_string(),
            password_hash: "hash".to_string(),
            email: None,
            birth_date: None,
            sex: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    fn handler() -> JwtHandler {
        JwtHandler::new("test-secret-key-12345", DEFAULT_TOKEN_TTL_SECS)
    }

    #[test]
    fn test_token_valid_until_just_before_expiry() {
        let handler = handler();
        let user = create_test_user();
        let token = handler.issue(&user, T0).unwrap();

        assert_eq!(handler.verify(&token, T0).unwrap(), user.id);
        assert_eq!(handler.verify(&token, T0 + 599).unwrap(), user.id);
    }

    #[test]
    fn test_token_expired_after_ttl() {
        let handler = handler();
        let token = handler.issue(&create_test_user(), T0).unwrap();

        assert_eq!(handler.verify(&token, T0 + 600), Err(TokenError::Expired));
        assert_eq!(handler.verify(&token, T0 + 601), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let handler = handler();
        let token = handler.issue(&create_test_user(), T0).unwrap();

        // Flip the first character of the signature segment
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(
            handler.verify(&tampered, T0 + 1),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1", DEFAULT_TOKEN_TTL_SECS);
        let handler2 = JwtHandler::new("secret2", DEFAULT_TOKEN_TTL_SECS);
        let token = handler1.issue(&create_test_user(), T0).unwrap();

        assert_eq!(
            handler2.verify(&token, T0 + 1),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let handler = handler();
        assert_eq!(handler.verify("", T0), Err(TokenError::Malformed));
        assert_eq!(
            handler.verify("invalid.token.here", T0),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_non_uuid_subject_is_malformed() {
        let handler = handler();
        let claims = Claims {
            sub: "admin".to_string(),
            login_id: "admin".to_string(),
            iat: T0,
            exp: T0 + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        assert_eq!(handler.verify(&token, T0 + 1), Err(TokenError::Malformed));
    }

    #[test]
    fn test_issue_now_round_trip() {
        let handler = handler();
        let user = create_test_user();
        let token = handler.issue_now(&user).unwrap();
        assert_eq!(handler.verify_now(&token).unwrap(), user.id);
    }

    #[test]
    fn test_issue_refuses_overflowing_expiry() {
        let handler = JwtHandler::new("test-secret-key-12345", i64::MAX);
        assert!(handler.issue(&create_test_user(), T0).is_err());
    }
}
