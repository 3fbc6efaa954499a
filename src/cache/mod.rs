//! Session cache collaborator interface.
//!
//! The cache is the source of truth for "is this token currently valid": the
//! token service writes an entry at issue time and deletes it on revocation,
//! and every key carries its own expiry. Redis backs production; an in-memory
//! implementation backs tests and local development.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

/// Key-value store with per-key expiry.
///
/// All methods are safe for concurrent use; `delete` is idempotent.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Enumerate live keys under a prefix (used for cascading revocation).
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
