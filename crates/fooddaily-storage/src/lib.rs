//! fooddaily-storage: Storage abstraction layer
//!
//! This crate provides the storage abstraction for the Food Daily backend,
//! including:
//! - DocumentStore trait for persistence operations
//! - Typed document records (users, food items, purchases, feedback)
//! - In-memory implementation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             fooddaily-storage                │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs   - DocumentStore trait + records│
//! │  memory.rs   - In-memory implementation     │
//! │  error.rs    - Storage error taxonomy       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use memory::MemoryDocumentStore;
pub use traits::{
    DeleteAck, DocumentStore, FeedbackEntry, FoodItem, FoodItemUpdate, InsertAck, NewFoodItem,
    NewPurchase, NewUser, Role, PurchaseRecord, UpdateAck, User,
};
