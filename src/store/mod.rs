//! Credential store collaborator interface.
//!
//! Persists user identity records. Postgres backs production; an in-memory
//! implementation backs tests and local development. Email uniqueness is
//! enforced at write time by the store (unique constraint in Postgres),
//! never by a read-then-write in the caller.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryStore;
pub use self::postgres::PgStore;

/// User role. Admins may change other users' role/whitelist fields.
#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Full identity record as stored. The password hash never leaves the crate;
/// serialization to clients goes through the public user view instead.
#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Role,
    pub whitelisted: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a user. Role defaults to `user` and
/// `whitelisted` to `false` at the store layer.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}

/// Outcome of an insert attempt; `Conflict` maps a unique-constraint
/// violation, keeping the check-and-write atomic.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(UserRecord),
    Conflict,
}

/// Persistence operations the auth flows need.
///
/// Email matches are case-sensitive, exactly as stored.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;

    async fn insert(&self, new_user: NewUser) -> Result<InsertOutcome>;

    /// Replace the password hash for an email. Returns `false` when no row matched.
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool>;

    /// Update role and whitelist flag. Returns `false` when no row matched.
    async fn update_permissions(&self, id: Uuid, role: Role, whitelisted: bool) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::from_str("user"), Ok(Role::User));
        assert_eq!(Role::from_str("admin"), Ok(Role::Admin));
        assert!(Role::from_str("root").is_err());
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn role_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
