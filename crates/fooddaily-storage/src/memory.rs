//! In-memory storage implementation.
//!
//! Backs each collection with a `DashMap` keyed by document id, plus a
//! process-wide insertion sequence so list operations can return documents
//! in insertion order even though the maps themselves are unordered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;
use ulid::Ulid;

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    DeleteAck, DocumentStore, FeedbackEntry, FoodItem, FoodItemUpdate, InsertAck, NewFoodItem,
    NewPurchase, NewUser, PurchaseRecord, Role, UpdateAck, User,
};

/// A document tagged with its insertion sequence number.
#[derive(Debug, Clone)]
struct Versioned<T> {
    seq: u64,
    doc: T,
}

/// In-memory implementation of DocumentStore.
///
/// # Performance Characteristics
///
/// - **Insert / delete by id**: O(1) average (DashMap)
/// - **List / search / top-N**: O(N) over the collection (linear scan + sort)
/// - **Purchase**: O(1); serializes on the target food item's map entry,
///   which is what makes the record-insert/counter-adjust pair atomic
///
/// Uses DashMap for thread-safe concurrent access without a global lock.
/// The email index keeps registration's check-then-insert atomic via the
/// entry API.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    users: DashMap<String, Versioned<User>>,
    /// email -> user id. Uniqueness is enforced here, not by scanning.
    user_ids_by_email: DashMap<String, String>,
    foods: DashMap<String, Versioned<FoodItem>>,
    purchases: DashMap<String, Versioned<PurchaseRecord>>,
    feedback: DashMap<String, Versioned<FeedbackEntry>>,
    seq: AtomicU64,
}

impl MemoryDocumentStore {
    /// Creates a new in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory document store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
}

/// Collects documents matching `filter`, sorted by insertion sequence.
fn collect_ordered<T, F>(map: &DashMap<String, Versioned<T>>, filter: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let mut docs: Vec<(u64, T)> = map
        .iter()
        .filter(|entry| filter(&entry.doc))
        .map(|entry| (entry.seq, entry.doc.clone()))
        .collect();
    docs.sort_by_key(|(seq, _)| *seq);
    docs.into_iter().map(|(_, doc)| doc).collect()
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_user(&self, user: NewUser) -> StorageResult<InsertAck> {
        // The email index entry is the uniqueness gate: holding the vacant
        // slot prevents a concurrent registration of the same email between
        // the check and the insert.
        match self.user_ids_by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StorageError::UserAlreadyExists { email: user.email }),
            Entry::Vacant(slot) => {
                let id = Ulid::new().to_string();
                let record = User {
                    id: id.clone(),
                    email: user.email,
                    role: Role::Default,
                };
                self.users.insert(
                    id.clone(),
                    Versioned {
                        seq: self.next_seq(),
                        doc: record,
                    },
                );
                slot.insert(id.clone());
                Ok(InsertAck { inserted_id: id })
            }
        }
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        Ok(collect_ordered(&self.users, |_| true))
    }

    async fn delete_user(&self, id: &str) -> StorageResult<DeleteAck> {
        match self.users.remove(id) {
            Some((_, removed)) => {
                self.user_ids_by_email.remove(&removed.doc.email);
                Ok(DeleteAck { deleted_count: 1 })
            }
            None => Ok(DeleteAck { deleted_count: 0 }),
        }
    }

    async fn promote_user(&self, id: &str) -> StorageResult<UpdateAck> {
        let Some(mut entry) = self.users.get_mut(id) else {
            return Ok(UpdateAck {
                matched_count: 0,
                modified_count: 0,
            });
        };

        let modified = u64::from(entry.doc.role != Role::Admin);
        entry.doc.role = Role::Admin;

        Ok(UpdateAck {
            matched_count: 1,
            modified_count: modified,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let Some(id) = self.user_ids_by_email.get(email) else {
            return Ok(None);
        };
        Ok(self.users.get(id.value()).map(|entry| entry.doc.clone()))
    }

    async fn insert_food(&self, food: NewFoodItem) -> StorageResult<InsertAck> {
        let id = Ulid::new().to_string();
        let record = FoodItem {
            id: id.clone(),
            food_name: food.food_name,
            quantity: food.quantity,
            price: food.price,
            food_origin: food.food_origin,
            food_image: food.food_image,
            food_category: food.food_category,
            description: food.description,
            user_email: food.user_email,
            purchase_count: food.purchase_count,
        };
        self.foods.insert(
            id.clone(),
            Versioned {
                seq: self.next_seq(),
                doc: record,
            },
        );
        Ok(InsertAck { inserted_id: id })
    }

    async fn list_foods(&self) -> StorageResult<Vec<FoodItem>> {
        Ok(collect_ordered(&self.foods, |_| true))
    }

    async fn get_food(&self, id: &str) -> StorageResult<Option<FoodItem>> {
        Ok(self.foods.get(id).map(|entry| entry.doc.clone()))
    }

    async fn update_food(&self, id: &str, update: FoodItemUpdate) -> StorageResult<UpdateAck> {
        let Some(mut entry) = self.foods.get_mut(id) else {
            return Ok(UpdateAck {
                matched_count: 0,
                modified_count: 0,
            });
        };

        let before = entry.doc.clone();
        let doc = &mut entry.doc;
        if let Some(food_name) = update.food_name {
            doc.food_name = food_name;
        }
        if let Some(quantity) = update.quantity {
            doc.quantity = quantity;
        }
        if let Some(price) = update.price {
            doc.price = price;
        }
        if let Some(food_origin) = update.food_origin {
            doc.food_origin = food_origin;
        }
        if let Some(food_image) = update.food_image {
            doc.food_image = food_image;
        }
        if let Some(food_category) = update.food_category {
            doc.food_category = food_category;
        }
        if let Some(description) = update.description {
            doc.description = description;
        }

        Ok(UpdateAck {
            matched_count: 1,
            modified_count: u64::from(entry.doc != before),
        })
    }

    async fn top_foods(&self, limit: usize) -> StorageResult<Vec<FoodItem>> {
        let mut docs: Vec<(u64, FoodItem)> = self
            .foods
            .iter()
            .map(|entry| (entry.seq, entry.doc.clone()))
            .collect();
        // Purchase count descending; ties keep insertion order.
        docs.sort_by(|(seq_a, a), (seq_b, b)| {
            b.purchase_count
                .cmp(&a.purchase_count)
                .then_with(|| seq_a.cmp(seq_b))
        });
        docs.truncate(limit);
        Ok(docs.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn search_foods(&self, term: &str) -> StorageResult<Vec<FoodItem>> {
        let needle = term.to_lowercase();
        Ok(collect_ordered(&self.foods, |food| {
            food.food_name.to_lowercase().contains(&needle)
        }))
    }

    async fn foods_by_owner(&self, email: &str) -> StorageResult<Vec<FoodItem>> {
        Ok(collect_ordered(&self.foods, |food| food.user_email == email))
    }

    #[instrument(skip(self), fields(food_id = %purchase.food_id))]
    async fn record_purchase(&self, purchase: NewPurchase) -> StorageResult<InsertAck> {
        // The food entry's guard is held across the record insert and the
        // counter adjustment, so concurrent purchases of the same item
        // serialize here and the pair stays consistent.
        let mut food = self
            .foods
            .get_mut(&purchase.food_id)
            .ok_or_else(|| StorageError::FoodNotFound {
                id: purchase.food_id.clone(),
            })?;

        let id = Ulid::new().to_string();
        let record = PurchaseRecord {
            id: id.clone(),
            food_id: purchase.food_id,
            email: purchase.email,
            quantity: purchase.quantity,
        };
        self.purchases.insert(
            id.clone(),
            Versioned {
                seq: self.next_seq(),
                doc: record,
            },
        );

        food.doc.quantity -= purchase.quantity;
        food.doc.purchase_count += 1;

        Ok(InsertAck { inserted_id: id })
    }

    async fn purchases_by_email(&self, email: &str) -> StorageResult<Vec<PurchaseRecord>> {
        Ok(collect_ordered(&self.purchases, |record| {
            record.email == email
        }))
    }

    async fn delete_purchase(&self, id: &str, email: &str) -> StorageResult<DeleteAck> {
        let removed = self
            .purchases
            .remove_if(id, |_, entry| entry.doc.email == email);
        Ok(DeleteAck {
            deleted_count: u64::from(removed.is_some()),
        })
    }

    async fn insert_feedback(
        &self,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> StorageResult<InsertAck> {
        let id = Ulid::new().to_string();
        let record = FeedbackEntry {
            id: id.clone(),
            fields,
        };
        self.feedback.insert(
            id.clone(),
            Versioned {
                seq: self.next_seq(),
                doc: record,
            },
        );
        Ok(InsertAck { inserted_id: id })
    }

    async fn list_feedback(&self) -> StorageResult<Vec<FeedbackEntry>> {
        Ok(collect_ordered(&self.feedback, |_| true))
    }

    async fn first_feedback(&self, limit: usize) -> StorageResult<Vec<FeedbackEntry>> {
        let mut entries = collect_ordered(&self.feedback, |_| true);
        entries.truncate(limit);
        Ok(entries)
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}
