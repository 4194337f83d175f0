//! Application state for HTTP handlers.

use std::sync::Arc;

use fooddaily_auth::TokenService;
use fooddaily_storage::DocumentStore;

/// Application state shared across all HTTP handlers.
///
/// Holds the injected storage backend and the token service. The store's
/// lifecycle belongs to process startup and shutdown; handlers only borrow
/// it through this state.
///
/// # Type Parameters
///
/// * `S` - The storage backend implementing `DocumentStore`
#[derive(Clone)]
pub struct AppState<S: DocumentStore> {
    /// The storage backend.
    pub store: Arc<S>,
    /// Token issuing and verification.
    pub tokens: TokenService,
}

impl<S: DocumentStore> AppState<S> {
    /// Creates a new application state.
    pub fn new(store: Arc<S>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}
