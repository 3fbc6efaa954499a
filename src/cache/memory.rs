//! In-memory session cache for tests and local development.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::SessionCache;

/// `HashMap`-backed cache with `Instant`-based expiry.
///
/// Expired entries are purged lazily on access, which is enough for test
/// scenarios; nothing in the trait contract requires eager eviction.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force-expire a key, simulating TTL elapse without waiting.
    pub fn expire_now(&self, key: &str) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        if let Some(entry) = entries.get_mut(key) {
            // Checks use strict `expiry > now`, so "expires right now" is expired
            entry.1 = Instant::now();
        }
    }

    /// Number of unexpired entries, for test assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries.values().filter(|(_, expiry)| *expiry > now).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some((value, expiry)) if *expiry > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.lock().expect("cache lock poisoned");
        Ok(entries
            .iter()
            .filter(|(key, (_, expiry))| key.starts_with(prefix) && *expiry > now)
            .map(|(key, _)| key.clone())
            .collect())
    }
}
