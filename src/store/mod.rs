//! Credential records and the store that owns them.
//!
//! The store is the only shared mutable resource: it must provide atomic
//! single-record reads/writes and enforce uniqueness on the normalized email.
//! Records are never mutated by handlers directly; every write goes through
//! the operations below.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryUserStore;
pub use self::postgres::PgUserStore;

/// A persisted credential record.
///
/// `hashed_password` only ever holds Password Hasher output; the type is
/// deliberately not serializable so the hash cannot leak into a response.
#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new record; the id and timestamps are assigned on insert.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub full_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with this email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence operations for credential records.
///
/// Emails passed in are expected to already be normalized (trimmed,
/// lowercased); uniqueness applies to the normalized form.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new record, rejecting duplicate emails.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Apply a partial update; returns `None` if the record does not exist.
    async fn update(&self, id: Uuid, changes: UserChanges)
        -> Result<Option<UserRecord>, StoreError>;

    /// Delete a record; returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Page through records in insertion order.
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError>;

    /// Total number of records, independent of paging.
    async fn count(&self) -> Result<i64, StoreError>;
}
