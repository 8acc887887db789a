use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Remembers which `(token, origin)` pairs already passed the access check.
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn has_api_token(&self, token: &str, origin: &str) -> Result<bool>;
    async fn add_api_token(&self, token: &str, origin: &str) -> Result<()>;
}

#[async_trait]
impl<C: TokenCache + ?Sized> TokenCache for Arc<C> {
    async fn has_api_token(&self, token: &str, origin: &str) -> Result<bool> { (**self).has_api_token(token, origin).await }
    async fn add_api_token(&self, token: &str, origin: &str) -> Result<()> { (**self).add_api_token(token, origin).await }
}

/// Process-local cache; entries expire after `ttl_secs` (never when `None`).
#[derive(Debug, Default)]
pub struct MemoryTokenCache {
    entries: Mutex<HashMap<(String, String), Option<i64>>>,
    ttl_secs: Option<i64>,
}

impl MemoryTokenCache {
    pub fn new() -> Self { Self::default() }
    pub fn with_ttl(ttl_secs: i64) -> Self { Self { entries: Mutex::default(), ttl_secs: Some(ttl_secs) } }

    pub fn len(&self) -> usize { self.entries.lock().map(|m| m.len()).unwrap_or(0) }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn has_api_token(&self, token: &str, origin: &str) -> Result<bool> {
        let entries = self.entries.lock().map_err(|_| anyhow!("token cache lock poisoned"))?;
        Ok(match entries.get(&(token.to_string(), origin.to_string())) {
            Some(Some(expires_at)) => *expires_at > current_epoch(),
            Some(None) => true,
            None => false,
        })
    }

    async fn add_api_token(&self, token: &str, origin: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("token cache lock poisoned"))?;
        let expires_at = self.ttl_secs.map(|ttl| current_epoch() + ttl);
        entries.insert((token.to_string(), origin.to_string()), expires_at);
        Ok(())
    }
}

pub(crate) fn current_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remembers_by_token_and_origin() {
        let cache = MemoryTokenCache::new();
        assert!(!cache.has_api_token("t", "kodik").await.unwrap());
        cache.add_api_token("t", "kodik").await.unwrap();
        assert!(cache.has_api_token("t", "kodik").await.unwrap());
        assert!(!cache.has_api_token("t", "mirror").await.unwrap());
        assert!(!cache.has_api_token("other", "kodik").await.unwrap());
    }

    #[tokio::test]
    async fn repeated_adds_keep_one_entry() {
        let cache = MemoryTokenCache::new();
        cache.add_api_token("t", "kodik").await.unwrap();
        cache.add_api_token("t", "kodik").await.unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = MemoryTokenCache::with_ttl(-1);
        cache.add_api_token("t", "kodik").await.unwrap();
        assert!(!cache.has_api_token("t", "kodik").await.unwrap());
    }
}
