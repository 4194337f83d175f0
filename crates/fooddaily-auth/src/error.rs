//! Authentication error types.

use thiserror::Error;

/// Token verification and issuing errors.
///
/// Expiry is kept distinct so callers can log it separately, but both
/// variants map to the same unauthenticated outcome at the HTTP layer.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token's signature was valid but it has expired.
    #[error("token expired")]
    Expired,

    /// The token is missing, malformed, or carries a bad signature.
    #[error("invalid token: {message}")]
    Invalid { message: String },

    /// Token creation failed.
    #[error("failed to sign token: {message}")]
    Signing { message: String },
}
