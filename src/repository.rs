use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ContentItem, ContentKind, Profile};

/// StoreError
///
/// Failure taxonomy for remote record operations. Every store call is
/// attempted exactly once; the caller decides whether to surface or retry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store processed the request and rejected it. Carries the
    /// provider-reported reason (constraint violation, RLS denial, ...).
    #[error("content store rejected the request: {0}")]
    Provider(String),
    /// The request never completed (DNS, TLS, connection failures).
    #[error("content store request failed: {0}")]
    Transport(String),
}

/// ProfileStore
///
/// Abstract contract for the per-user profile lookup. Fetch failures fold to
/// `None`: the Role Resolver treats an unreadable profile exactly like a
/// missing one (fail-closed to guest), so the distinction never crosses this
/// boundary.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Option<Profile>;
}

/// ContentStore
///
/// Abstract contract for the two content collections. Insertion order and
/// timestamping are the store's own business; this crate never synthesizes
/// `created_at` for real records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Inserts one record into the collection matching `kind` and returns the
    /// inserted representation(s) as materialized by the store.
    async fn insert(&self, kind: ContentKind, record: Value)
    -> Result<Vec<ContentItem>, StoreError>;

    /// Full-collection fetch ordered by `created_at` descending (most recent
    /// first). No pagination, no filtering, no caching.
    async fn list_recent(&self, kind: ContentKind) -> Result<Vec<ContentItem>, StoreError>;
}

/// The concrete types used to share store access across the component graph.
pub type ProfileState = Arc<dyn ProfileStore>;
pub type ContentState = Arc<dyn ContentStore>;

// --- The Mock Implementations (For Unit Tests) ---

/// MockProfileStore
///
/// In-memory profile lookup for tests. `should_fail` simulates an unreachable
/// store, which per the fail-closed contract is indistinguishable from a
/// missing profile.
pub struct MockProfileStore {
    profiles: RwLock<HashMap<Uuid, Profile>>,
    /// When true, every lookup behaves like a failed fetch.
    pub should_fail: bool,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            should_fail: true,
        }
    }

    /// Builder-style seeding for test setup.
    pub fn with_profile(self, profile: Profile) -> Self {
        self.profiles
            .write()
            .expect("profile lock poisoned")
            .insert(profile.id, profile);
        self
    }
}

impl Default for MockProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn get_profile(&self, id: Uuid) -> Option<Profile> {
        if self.should_fail {
            return None;
        }
        self.profiles
            .read()
            .expect("profile lock poisoned")
            .get(&id)
            .cloned()
    }
}

/// MockContentStore
///
/// In-memory content collections for tests. Inserted raw records are retained
/// verbatim so tests can assert exactly what the gate handed to the store
/// (ownership stamping, untouched-store properties). Like the real store, it
/// assigns `id` and `created_at` at insertion time and requires the stamped
/// ownership columns to be present.
pub struct MockContentStore {
    items: RwLock<Vec<(ContentKind, ContentItem)>>,
    inserted: Mutex<Vec<(ContentKind, Value)>>,
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            inserted: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            inserted: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }

    /// Seeds a pre-existing item (with an explicit `created_at`) for listing
    /// order assertions.
    pub fn seed(&self, kind: ContentKind, item: ContentItem) {
        self.items
            .write()
            .expect("item lock poisoned")
            .push((kind, item));
    }

    /// Every raw record handed to `insert`, in call order.
    pub fn insert_calls(&self) -> Vec<(ContentKind, Value)> {
        self.inserted.lock().expect("insert lock poisoned").clone()
    }

    pub fn insert_count(&self) -> usize {
        self.inserted.lock().expect("insert lock poisoned").len()
    }

    /// Materializes a raw insert record the way the real store would: the
    /// stamped ownership columns are mandatory (NOT NULL in the schema), and
    /// `id` / `created_at` are store-assigned.
    fn materialize(record: &Value) -> Result<ContentItem, StoreError> {
        let mut fields = record
            .as_object()
            .ok_or_else(|| StoreError::Provider("record must be a JSON object".to_string()))?
            .clone();

        let user_id: Uuid = fields
            .remove("user_id")
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or_else(|| {
                StoreError::Provider("null value in column \"user_id\"".to_string())
            })?;
        let author_email = fields
            .remove("author_email")
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| {
                StoreError::Provider("null value in column \"author_email\"".to_string())
            })?;

        Ok(ContentItem {
            id: Uuid::new_v4(),
            user_id,
            author_email,
            created_at: Utc::now(),
            fields,
        })
    }
}

impl Default for MockContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn insert(
        &self,
        kind: ContentKind,
        record: Value,
    ) -> Result<Vec<ContentItem>, StoreError> {
        if self.should_fail {
            return Err(StoreError::Provider(
                "Mock store error: simulation requested".to_string(),
            ));
        }

        self.inserted
            .lock()
            .expect("insert lock poisoned")
            .push((kind, record.clone()));

        let item = Self::materialize(&record)?;
        self.items
            .write()
            .expect("item lock poisoned")
            .push((kind, item.clone()));
        Ok(vec![item])
    }

    async fn list_recent(&self, kind: ContentKind) -> Result<Vec<ContentItem>, StoreError> {
        if self.should_fail {
            return Err(StoreError::Provider(
                "Mock store error: simulation requested".to_string(),
            ));
        }

        let mut items: Vec<ContentItem> = self
            .items
            .read()
            .expect("item lock poisoned")
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}
