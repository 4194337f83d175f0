//! HS256 token service.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Fixed token lifetime in seconds. Not configurable per call.
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Claims carried by an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The caller's claimed identity.
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies HS256-signed tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    /// Creates a token service signing with the given shared secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::seconds(TOKEN_LIFETIME_SECS),
        }
    }

    /// Signs a token asserting the given email, expiring in one hour.
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| AuthError::Signing {
            message: e.to_string(),
        })
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid {
                    message: e.to_string(),
                },
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keys are secrets; never print them.
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_roundtrips_claims() {
        let service = TokenService::new("test-secret");

        let token = service.issue("a@x.com").unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn verify_rejects_token_signed_with_other_secret() {
        let service = TokenService::new("test-secret");
        let other = TokenService::new("other-secret");

        let token = other.issue("a@x.com").unwrap();

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::Invalid { .. })
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        let service = TokenService::new("test-secret");

        assert!(matches!(
            service.verify("not-a-token"),
            Err(AuthError::Invalid { .. })
        ));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let service = TokenService::new("test-secret");

        // Signed with the right secret, but expired well past the
        // validator's leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: "a@x.com".to_string(),
            iat: now - 2 * TOKEN_LIFETIME_SECS,
            exp: now - TOKEN_LIFETIME_SECS,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(service.verify(&token), Err(AuthError::Expired)));
    }
}
