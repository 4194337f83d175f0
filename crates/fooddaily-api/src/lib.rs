//! fooddaily-api: HTTP API layer
//!
//! This crate provides the HTTP layer for the Food Daily backend:
//! - REST endpoints via Axum
//! - Bearer-token authorization extractor
//! - Configuration loading
//! - Structured logging bootstrap
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               fooddaily-api                  │
//! ├─────────────────────────────────────────────┤
//! │  http/          - REST endpoints + state    │
//! │  middleware/    - Auth extractor, CORS      │
//! │  observability/ - Logging setup             │
//! │  config.rs      - Configuration management  │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod middleware;
pub mod observability;
