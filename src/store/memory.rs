//! In-memory store used by tests and local experiments.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{NewUser, StoreError, UserChanges, UserRecord, UserStore};

/// A `UserStore` backed by a mutex-guarded map.
///
/// Enforces the same email uniqueness the Postgres store gets from its unique
/// index, so resolver and handler tests exercise the real conflict paths.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            hashed_password: user.hashed_password,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            full_name: user.full_name,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().await;
        if let Some(email) = &changes.email {
            if users
                .values()
                .any(|other| other.id != id && &other.email == email)
            {
                return Err(StoreError::DuplicateEmail);
            }
        }
        let Some(record) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            record.email = email;
        }
        if let Some(hashed_password) = changes.hashed_password {
            record.hashed_password = hashed_password;
        }
        if let Some(is_active) = changes.is_active {
            record.is_active = is_active;
        }
        if let Some(is_superuser) = changes.is_superuser {
            record.is_superuser = is_superuser;
        }
        if let Some(full_name) = changes.full_name {
            record.full_name = Some(full_name);
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        Ok(users.remove(&id).is_some())
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        let mut records: Vec<UserRecord> = users.values().cloned().collect();
        records.sort_by_key(|record| (record.created_at, record.id));
        Ok(records
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let users = self.users.lock().await;
        Ok(i64::try_from(users.len()).unwrap_or(i64::MAX))
    }
}
