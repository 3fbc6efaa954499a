//! In-memory credential store for tests and local development.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{CredentialStore, InsertOutcome, NewUser, Role, UserRecord};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.lock().expect("store lock poisoned");
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let users = self.users.lock().expect("store lock poisoned");
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<InsertOutcome> {
        let mut users = self.users.lock().expect("store lock poisoned");
        // Case-sensitive uniqueness, matching the Postgres unique constraint
        if users.values().any(|user| user.email == new_user.email) {
            return Ok(InsertOutcome::Conflict);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            role: Role::User,
            whitelisted: false,
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());
        Ok(InsertOutcome::Created(record))
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool> {
        let mut users = self.users.lock().expect("store lock poisoned");
        match users.values_mut().find(|user| user.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_permissions(&self, id: Uuid, role: Role, whitelisted: bool) -> Result<bool> {
        let mut users = self.users.lock().expect("store lock poisoned");
        match users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                user.whitelisted = whitelisted;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
