//! Observability infrastructure.
//!
//! This module provides structured logging configuration. Request-level
//! tracing comes from the router's `tower_http` trace layer.

mod logging;

pub use logging::{init_logging, parse_log_level, LoggingConfig};
