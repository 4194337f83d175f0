//! fooddaily-auth: Token issuing and verification
//!
//! Signed, time-limited credentials asserting a caller's claimed identity.
//! Tokens are HS256 JWTs with a fixed 1-hour lifetime; a token is valid
//! purely by signature and expiry. There is no session store, no
//! revocation, and no refresh.

pub mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenService, TOKEN_LIFETIME_SECS};
