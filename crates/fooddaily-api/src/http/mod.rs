//! HTTP REST API endpoints.
//!
//! Implements the Food Daily REST surface using Axum.
//!
//! # Endpoints
//!
//! | Endpoint | Method | Auth | Description |
//! |----------|--------|------|-------------|
//! | `/jwt` | POST | none | Issue signed token |
//! | `/user` | POST/GET | none | Register / list users |
//! | `/user/{id}` | DELETE/PATCH | none | Delete / promote user |
//! | `/userRole/{email}` | GET | token | Caller's role |
//! | `/all-foods` | POST/GET/PATCH | PATCH: token | Food catalog |
//! | `/top-foods` | GET | none | Top 6 by purchase count |
//! | `/search-foods` | GET | none | Name substring search |
//! | `/foodDetails/{id}` | GET | none | One item |
//! | `/myList` | GET | token | Caller's items |
//! | `/purchase` | POST | none | Record purchase |
//! | `/purchase/{id}` | GET | token | Item being purchased |
//! | `/myOrder` | GET/DELETE | token | Caller's purchase records |
//! | `/feedback` | POST/GET | none | Feedback |
//! | `/testimonials` | GET | none | First 4 feedback entries |

pub mod routes;
pub mod state;

pub use routes::{create_router, create_router_with_body_limit, ApiError, DEFAULT_BODY_LIMIT};
pub use state::AppState;
