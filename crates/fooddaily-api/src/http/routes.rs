//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use fooddaily_storage::{
    DeleteAck, DocumentStore, FeedbackEntry, FoodItem, FoodItemUpdate, InsertAck, NewFoodItem,
    NewPurchase, NewUser, PurchaseRecord, Role, StorageError, UpdateAck, User,
};

use super::state::AppState;
use crate::middleware::{cors_layer, Identity};

/// Custom JSON extractor that returns 400 Bad Request instead of 422
/// Unprocessable Entity for deserialization errors.
///
/// Preserves 413 Payload Too Large for body limit errors.
pub struct JsonBadRequest<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBadRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBadRequest(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    Err(ApiError::new(error_codes::PAYLOAD_TOO_LARGE, message))
                } else {
                    Err(ApiError::validation_error(message))
                }
            }
        }
    }
}

/// Default request body size limit (1MB).
/// This prevents memory exhaustion from oversized payloads.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Number of items returned by the top-foods query.
const TOP_FOODS_LIMIT: usize = 6;

/// Number of feedback entries returned by the testimonials query.
const TESTIMONIALS_LIMIT: usize = 4;

/// Private helper for the API routes.
///
/// Consolidates the full route set in one place; auth-gated routes take the
/// [`Identity`] extractor, everything else is open.
fn api_routes<S: DocumentStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Token issuing
        .route("/jwt", post(issue_token::<S>))
        // Users
        .route("/user", post(register_user::<S>).get(list_users::<S>))
        .route(
            "/user/:id",
            delete(delete_user::<S>).patch(promote_user::<S>),
        )
        .route("/userRole/:email", get(user_role::<S>))
        // Food catalog
        .route(
            "/all-foods",
            post(create_food::<S>)
                .get(list_foods::<S>)
                .patch(update_food::<S>),
        )
        .route("/top-foods", get(top_foods::<S>))
        .route("/search-foods", get(search_foods::<S>))
        .route("/foodDetails/:id", get(food_details::<S>))
        .route("/myList", get(my_list::<S>))
        // Purchases
        .route("/purchase", post(record_purchase::<S>))
        .route("/purchase/:id", get(purchase_target::<S>))
        .route("/myOrder", get(my_orders::<S>).delete(delete_order::<S>))
        // Feedback
        .route(
            "/feedback",
            post(create_feedback::<S>).get(list_feedback::<S>),
        )
        .route("/testimonials", get(testimonials::<S>))
}

/// Creates the HTTP router with all endpoints.
///
/// Applies the default body size limit (1MB) to protect against oversized
/// payloads.
pub fn create_router<S: DocumentStore>(state: AppState<S>) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
///
/// # Arguments
///
/// * `state` - Application state with storage backend and token service
/// * `body_limit` - Maximum request body size in bytes
pub fn create_router_with_body_limit<S: DocumentStore>(
    state: AppState<S>,
    body_limit: usize,
) -> Router {
    let shared_state = Arc::new(state);
    api_routes::<S>()
        // Health and readiness checks
        .route("/", get(liveness))
        .route("/ready", get(readiness_check::<S>))
        .with_state(shared_state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// ============================================================
// Error Handling
// ============================================================

/// API error codes.
///
/// Each code maps to a specific HTTP status code via
/// [`ApiError::into_response`].
pub mod error_codes {
    /// Missing, malformed, invalid, or expired token.
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    /// Valid token whose identity does not match the requested one.
    pub const FORBIDDEN: &str = "forbidden";
    /// Generic input validation failure (undeserializable body, bad query).
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// The referenced document does not exist where one is required.
    pub const NOT_FOUND: &str = "not_found";
    /// Request body exceeds the configured size limit.
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    /// Unexpected internal server error.
    pub const INTERNAL_ERROR: &str = "internal_error";
    /// Storage backend unreachable.
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
}

/// API error response format.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates an unauthenticated error (401).
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(error_codes::UNAUTHENTICATED, message)
    }

    /// Creates a forbidden error (403).
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(error_codes::FORBIDDEN, message)
    }

    /// Creates a validation error (400).
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::VALIDATION_ERROR, message)
    }

    /// Creates a not found error (404).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(error_codes::NOT_FOUND, message)
    }

    /// Creates an internal error (500).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    /// Creates a service unavailable error (503).
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(error_codes::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use error_codes::*;

        let status = match self.code.as_str() {
            UNAUTHENTICATED => StatusCode::UNAUTHORIZED,
            FORBIDDEN => StatusCode::FORBIDDEN,
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            NOT_FOUND => StatusCode::NOT_FOUND,
            PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            SERVICE_UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            // 404 Not Found: the purchase target is required to exist
            StorageError::FoodNotFound { .. } => ApiError::not_found("food item not found"),
            // 400 Bad Request: validation errors
            StorageError::UserAlreadyExists { .. } | StorageError::InvalidInput { .. } => {
                ApiError::validation_error(err.to_string())
            }
            // 503 Service Unavailable: connection errors
            StorageError::ConnectionError { .. } => {
                error!("Storage unavailable: {}", err);
                ApiError::service_unavailable("storage backend unavailable")
            }
            _ => {
                error!("Storage error: {}", err);
                ApiError::internal_error(err.to_string())
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================
// Health and Readiness Checks
// ============================================================

/// Liveness probe - plain text, no dependencies checked.
async fn liveness() -> &'static str {
    "Food Daily server is running.."
}

/// Readiness check - validates that the storage backend is accessible.
///
/// Returns 200 if ready, 503 if the store is unavailable. Error details are
/// logged but not exposed in the response.
async fn readiness_check<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "checks": { "storage": "ok" }
            })),
        ),
        Err(e) => {
            error!("Readiness check failed: storage unavailable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "checks": { "storage": "unavailable" }
                })),
            )
        }
    }
}

// ============================================================
// Token Issuing
// ============================================================

/// Request body for token issuing.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

/// Response for token issuing.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

async fn issue_token<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    if body.email.trim().is_empty() {
        return Err(ApiError::validation_error("email must not be empty"));
    }

    let token = state.tokens.issue(&body.email).map_err(|e| {
        error!("Token signing failed: {}", e);
        ApiError::internal_error("failed to issue token")
    })?;

    Ok(Json(TokenResponse { token }))
}

// ============================================================
// Users
// ============================================================

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
}

/// Response for user registration.
///
/// The duplicate outcome reports existence with a null inserted id; a
/// successful insert carries the id and omits the message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub inserted_id: Option<String>,
}

async fn register_user<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    if body.email.trim().is_empty() {
        return Err(ApiError::validation_error("email must not be empty"));
    }

    match state.store.insert_user(NewUser { email: body.email }).await {
        Ok(ack) => Ok(Json(RegisterResponse {
            message: None,
            inserted_id: Some(ack.inserted_id),
        })),
        Err(StorageError::UserAlreadyExists { .. }) => Ok(Json(RegisterResponse {
            message: Some("User already exists".to_string()),
            inserted_id: None,
        })),
        Err(other) => Err(other.into()),
    }
}

async fn list_users<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users().await?))
}

async fn delete_user<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteAck>> {
    Ok(Json(state.store.delete_user(&id).await?))
}

async fn promote_user<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<UpdateAck>> {
    Ok(Json(state.store.promote_user(&id).await?))
}

/// Response for the caller's role lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleResponse {
    /// `null` when no user record exists for the email.
    pub user_role: Option<Role>,
}

async fn user_role<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
    identity: Identity,
) -> ApiResult<Json<UserRoleResponse>> {
    identity.ensure_email(&email)?;

    let user = state.store.find_user_by_email(&email).await?;
    Ok(Json(UserRoleResponse {
        user_role: user.map(|u| u.role),
    }))
}

// ============================================================
// Food Catalog
// ============================================================

async fn create_food<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<NewFoodItem>,
) -> ApiResult<Json<InsertAck>> {
    Ok(Json(state.store.insert_food(body).await?))
}

async fn list_foods<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Json<Vec<FoodItem>>> {
    Ok(Json(state.store.list_foods().await?))
}

/// Query parameters for the food update route.
#[derive(Debug, Deserialize)]
pub struct FoodUpdateQuery {
    pub id: String,
}

async fn update_food<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<FoodUpdateQuery>,
    _identity: Identity,
    JsonBadRequest(body): JsonBadRequest<FoodItemUpdate>,
) -> ApiResult<Json<UpdateAck>> {
    Ok(Json(state.store.update_food(&query.id, body).await?))
}

async fn top_foods<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Json<Vec<FoodItem>>> {
    Ok(Json(state.store.top_foods(TOP_FOODS_LIMIT).await?))
}

/// Query parameters for the food search route.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: String,
}

async fn search_foods<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<FoodItem>>> {
    Ok(Json(state.store.search_foods(&query.search).await?))
}

async fn food_details<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<FoodItem>>> {
    // A missing document is a null success, not an error.
    Ok(Json(state.store.get_food(&id).await?))
}

/// Query parameters for identity-scoped list routes.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub email: String,
}

async fn my_list<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<OwnerQuery>,
    identity: Identity,
) -> ApiResult<Json<Vec<FoodItem>>> {
    identity.ensure_email(&query.email)?;

    Ok(Json(state.store.foods_by_owner(&query.email).await?))
}

// ============================================================
// Purchases
// ============================================================

async fn record_purchase<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<NewPurchase>,
) -> ApiResult<Json<InsertAck>> {
    Ok(Json(state.store.record_purchase(body).await?))
}

async fn purchase_target<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<OwnerQuery>,
    identity: Identity,
) -> ApiResult<Json<Option<FoodItem>>> {
    identity.ensure_email(&query.email)?;

    Ok(Json(state.store.get_food(&id).await?))
}

async fn my_orders<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<OwnerQuery>,
    identity: Identity,
) -> ApiResult<Json<Vec<PurchaseRecord>>> {
    identity.ensure_email(&query.email)?;

    Ok(Json(state.store.purchases_by_email(&query.email).await?))
}

/// Query parameters for purchase-record deletion.
#[derive(Debug, Deserialize)]
pub struct OrderDeleteQuery {
    pub id: String,
    pub email: String,
}

async fn delete_order<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<OrderDeleteQuery>,
    identity: Identity,
) -> ApiResult<Json<DeleteAck>> {
    identity.ensure_email(&query.email)?;

    Ok(Json(
        state.store.delete_purchase(&query.id, &query.email).await?,
    ))
}

// ============================================================
// Feedback
// ============================================================

async fn create_feedback<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<serde_json::Map<String, serde_json::Value>>,
) -> ApiResult<Json<InsertAck>> {
    Ok(Json(state.store.insert_feedback(body).await?))
}

async fn list_feedback<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Json<Vec<FeedbackEntry>>> {
    Ok(Json(state.store.list_feedback().await?))
}

async fn testimonials<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ApiResult<Json<Vec<FeedbackEntry>>> {
    Ok(Json(state.store.first_feedback(TESTIMONIALS_LIMIT).await?))
}
