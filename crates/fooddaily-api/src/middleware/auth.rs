//! Bearer-token authorization extractor.
//!
//! The single reusable authorization predicate for identity-scoped routes:
//! the [`Identity`] extractor rejects with 401 before a handler runs, and
//! [`Identity::ensure_email`] is the 403 identity comparison applied where a
//! route is scoped to the caller's own records.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use fooddaily_auth::Claims;
use fooddaily_storage::DocumentStore;

use crate::http::routes::ApiError;
use crate::http::state::AppState;

/// The verified identity attached to a request.
///
/// Extraction fails with the unauthenticated outcome (401) when the
/// `Authorization: Bearer` header is missing, malformed, carries a bad
/// signature, or is expired. Identity comparison is a separate, later step.
#[derive(Debug, Clone)]
pub struct Identity(pub Claims);

impl Identity {
    /// The verified email this identity asserts.
    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Compares the verified identity against a request-supplied email.
    ///
    /// A mismatch is the forbidden outcome (403), distinct from
    /// unauthenticated.
    pub fn ensure_email(&self, email: &str) -> Result<(), ApiError> {
        if self.0.email == email {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "identity does not match the requested email",
            ))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<Arc<AppState<S>>> for Identity
where
    S: DocumentStore,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("missing authorization header"))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::unauthenticated("authorization header is not a bearer token")
        })?;

        let claims = state.tokens.verify(token).map_err(|e| {
            debug!("Token rejected: {}", e);
            ApiError::unauthenticated("invalid or expired token")
        })?;

        Ok(Identity(claims))
    }
}
