//! Pending reply persistence.

use crate::pending::PendingReply;
use botshell_cache::KvCache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache key prefix for pending reply records.
pub const KEY_PREFIX: &str = "botshell:reply";

/// Storage for pending reply state, keyed by scope.
pub trait ReplyStore: Send + Sync {
    fn get(&self, scope: &str) -> Option<PendingReply>;
    fn put(&self, scope: &str, pending: &PendingReply, ttl: Duration);
    fn forget(&self, scope: &str);
}

/// [`ReplyStore`] backed by the shared key-value cache.
///
/// Records are JSON-encoded. A record that no longer parses (e.g. written
/// by an older build) reads as absent rather than failing the update.
pub struct CacheReplyStore {
    cache: Arc<dyn KvCache>,
}

impl CacheReplyStore {
    pub fn new(cache: Arc<dyn KvCache>) -> Self {
        Self { cache }
    }

    fn key(scope: &str) -> String {
        format!("{KEY_PREFIX}:{scope}")
    }
}

impl ReplyStore for CacheReplyStore {
    fn get(&self, scope: &str) -> Option<PendingReply> {
        let bytes = self.cache.get(&Self::key(scope))?;
        match serde_json::from_slice(&bytes) {
            Ok(pending) => Some(pending),
            Err(err) => {
                debug!(scope, %err, "ignoring malformed pending reply record");
                None
            }
        }
    }

    fn put(&self, scope: &str, pending: &PendingReply, ttl: Duration) {
        let ttl = ttl.max(Duration::from_secs(1));
        match serde_json::to_vec(pending) {
            Ok(bytes) => self.cache.put(&Self::key(scope), bytes, Some(ttl)),
            Err(err) => warn!(scope, %err, "failed to serialize pending reply"),
        }
    }

    fn forget(&self, scope: &str) {
        self.cache.forget(&Self::key(scope));
    }
}
