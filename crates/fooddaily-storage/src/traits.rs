//! DocumentStore trait definition and document records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// Role assigned to a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Default,
    Admin,
}

/// A stored user record. Email is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Input for user registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
}

/// A stored food item.
///
/// `quantity` is decremented and `purchase_count` incremented by the
/// purchase side-effect; the remaining fields change only through edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    pub food_name: String,
    pub quantity: i64,
    pub price: f64,
    pub food_origin: String,
    pub food_image: String,
    pub food_category: String,
    pub description: String,
    pub user_email: String,
    pub purchase_count: i64,
}

/// Input for creating a food item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFoodItem {
    pub food_name: String,
    pub quantity: i64,
    pub price: f64,
    pub food_origin: String,
    pub food_image: String,
    pub food_category: String,
    pub description: String,
    pub user_email: String,
    #[serde(default)]
    pub purchase_count: i64,
}

/// Partial update for a food item's editable fields.
///
/// Absent fields are left untouched. Ownership (`user_email`) and the
/// purchase counter are never editable through this path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemUpdate {
    pub food_name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    pub food_origin: Option<String>,
    pub food_image: Option<String>,
    pub food_category: Option<String>,
    pub description: Option<String>,
}

/// A stored purchase record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub food_id: String,
    pub email: String,
    pub quantity: i64,
}

/// Input for recording a purchase.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    pub food_id: String,
    pub email: String,
    pub quantity: i64,
}

/// A stored feedback entry: an arbitrary JSON object plus a generated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Acknowledgment for an insert operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub inserted_id: String,
}

/// Acknowledgment for an update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Acknowledgment for a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub deleted_count: u64,
}

/// Abstract persistence interface for the Food Daily collections.
///
/// Implementations must be thread-safe (Send + Sync) and support
/// async operations. List operations return documents in insertion order.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    // User operations

    /// Inserts a user if no record shares the email.
    ///
    /// The existence check and the insert are a single atomic step; a
    /// duplicate email yields [`StorageError::UserAlreadyExists`] and
    /// leaves the collection unchanged.
    ///
    /// [`StorageError::UserAlreadyExists`]: crate::error::StorageError::UserAlreadyExists
    async fn insert_user(&self, user: NewUser) -> StorageResult<InsertAck>;

    /// Lists all users.
    async fn list_users(&self) -> StorageResult<Vec<User>>;

    /// Deletes a user by id. A missing id deletes nothing.
    async fn delete_user(&self, id: &str) -> StorageResult<DeleteAck>;

    /// Promotes a user to the admin role.
    async fn promote_user(&self, id: &str) -> StorageResult<UpdateAck>;

    /// Finds a user by email.
    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    // Food item operations

    /// Inserts a food item.
    async fn insert_food(&self, food: NewFoodItem) -> StorageResult<InsertAck>;

    /// Lists all food items.
    async fn list_foods(&self) -> StorageResult<Vec<FoodItem>>;

    /// Fetches one food item; `None` when absent.
    async fn get_food(&self, id: &str) -> StorageResult<Option<FoodItem>>;

    /// Applies a partial update to a food item's editable fields.
    async fn update_food(&self, id: &str, update: FoodItemUpdate) -> StorageResult<UpdateAck>;

    /// Returns up to `limit` items sorted by purchase count descending.
    /// Ties keep insertion order.
    async fn top_foods(&self, limit: usize) -> StorageResult<Vec<FoodItem>>;

    /// Case-insensitive substring search on the item name.
    async fn search_foods(&self, term: &str) -> StorageResult<Vec<FoodItem>>;

    /// Lists the items owned by the given email.
    async fn foods_by_owner(&self, email: &str) -> StorageResult<Vec<FoodItem>>;

    // Purchase operations

    /// Records a purchase and applies the stock adjustment atomically:
    /// the record insert, the quantity decrement, and the purchase-count
    /// increment either all happen or none do. A purchase against a
    /// nonexistent item is rejected with [`StorageError::FoodNotFound`].
    ///
    /// [`StorageError::FoodNotFound`]: crate::error::StorageError::FoodNotFound
    async fn record_purchase(&self, purchase: NewPurchase) -> StorageResult<InsertAck>;

    /// Lists the purchase records for the given email.
    async fn purchases_by_email(&self, email: &str) -> StorageResult<Vec<PurchaseRecord>>;

    /// Deletes a purchase record by id, only when the stored record's
    /// email matches `email`. A mismatch deletes nothing.
    async fn delete_purchase(&self, id: &str, email: &str) -> StorageResult<DeleteAck>;

    // Feedback operations

    /// Inserts a feedback entry.
    async fn insert_feedback(
        &self,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> StorageResult<InsertAck>;

    /// Lists all feedback entries.
    async fn list_feedback(&self) -> StorageResult<Vec<FeedbackEntry>>;

    /// Returns the first `limit` feedback entries in insertion order.
    async fn first_feedback(&self, limit: usize) -> StorageResult<Vec<FeedbackEntry>>;

    // Health

    /// Verifies that the backend is reachable.
    async fn ping(&self) -> StorageResult<()>;
}
