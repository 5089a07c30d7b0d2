//! Response cache for completions, keyed on recent conversation content.
//!
//! The key is a SHA-256 over the role and text of the last few messages, so
//! identical prompts hit regardless of earlier history. Entries expire after
//! a TTL measured on the injected clock and are evicted lazily on lookup.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{Clock, Message};

/// Messages that feed the key unless configured otherwise.
pub const DEFAULT_KEY_MESSAGES: usize = 3;
/// Entry lifetime unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct CachedCompletion {
    content: String,
    stored_at: Timestamp,
}

/// TTL cache of completion text.
pub struct CompletionCache {
    entries: RwLock<HashMap<String, CachedCompletion>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    key_messages: usize,
}

impl CompletionCache {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration, key_messages: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            ttl,
            key_messages: key_messages.max(1),
        }
    }

    /// Cache key for a conversation.
    pub fn key_for(&self, conversation: &[Message]) -> String {
        let start = conversation.len().saturating_sub(self.key_messages);
        let mut hasher = Sha256::new();
        for message in &conversation[start..] {
            hasher.update(message.role.as_str().as_bytes());
            hasher.update(b"\x1f");
            hasher.update(message.content.as_bytes());
            hasher.update(b"\x1e");
        }
        format!("{:x}", hasher.finalize())
    }

    /// Cached text for a key, if present and fresh.
    pub async fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry, &now) => Some(entry.content.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn put(&self, key: String, content: String) {
        let entry = CachedCompletion {
            content,
            stored_at: self.clock.now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_fresh(&self, entry: &CachedCompletion, now: &Timestamp) -> bool {
        now.is_before(&entry.stored_at.plus(self.ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;

    fn cache() -> (CompletionCache, ManualClock) {
        let clock = ManualClock::new(Timestamp::from_unix_secs(1_000_000));
        let cache = CompletionCache::new(Arc::new(clock.clone()), DEFAULT_TTL, DEFAULT_KEY_MESSAGES);
        (cache, clock)
    }

    #[test]
    fn key_uses_only_last_messages() {
        let (cache, _) = cache();
        let tail = vec![Message::system("s"), Message::user("u"), Message::assistant("a")];
        let mut longer = vec![Message::user("earlier")];
        longer.extend(tail.clone());
        assert_eq!(cache.key_for(&tail), cache.key_for(&longer));
    }

    #[test]
    fn key_depends_on_role_and_content() {
        let (cache, _) = cache();
        let a = cache.key_for(&[Message::user("hello")]);
        let b = cache.key_for(&[Message::assistant("hello")]);
        let c = cache.key_for(&[Message::user("hello!")]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn fresh_entries_are_returned() {
        let (cache, clock) = cache();
        cache.put("k".into(), "v".into()).await;
        clock.advance(Duration::from_secs(23 * 60 * 60));
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn expired_entries_are_evicted_on_lookup() {
        let (cache, clock) = cache();
        cache.put("k".into(), "v".into()).await;
        clock.advance(DEFAULT_TTL);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("k").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let (cache, _) = cache();
        cache.put("a".into(), "1".into()).await;
        cache.put("b".into(), "2".into()).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
