//! API middleware.
//!
//! Includes:
//! - Bearer-token authorization extractor
//! - CORS configuration

mod auth;

pub use auth::Identity;

use tower_http::cors::{Any, CorsLayer};

/// Creates a CORS layer with permissive settings for development.
///
/// In production, you should restrict origins, methods, and headers.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
