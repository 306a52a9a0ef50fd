//! # Profile Store
//!
//! The persistence client used inside procedure handlers.
//!
//! The dispatch boundary treats this as an opaque injected dependency;
//! it is wired into the procedures at registration time and never
//! touched by the pipeline itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::RwLock;

// =============================================================================
// PROFILE RECORD
// =============================================================================

/// A stored user-profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning principal.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Last update, milliseconds since the Unix epoch.
    pub updated_at_ms: u64,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =============================================================================
// STORE CAPABILITY
// =============================================================================

/// Errors from the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not serve the request.
    #[error("Profile store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence client consumed by procedure handlers.
///
/// # Extension Point
///
/// `MemoryProfileStore` below serves development and tests; production
/// deployments implement this trait over their relational store and
/// inject it at registration time.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by owner.
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Insert or replace a profile.
    async fn upsert(&self, profile: UserProfile) -> Result<(), StoreError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// In-memory profile store. BTreeMap for deterministic iteration in
/// debugging output.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: RwLock<BTreeMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given profiles.
    #[must_use]
    pub fn seeded(profiles: Vec<UserProfile>) -> Self {
        let records = profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, profile: UserProfile) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
