//! Key-value cache seam for registry snapshots, dictionaries, and pending
//! reply state.
//!
//! Callers serialize their own payloads; the cache stores opaque bytes. A
//! miss and an expired entry are indistinguishable on purpose. Backends that
//! can fail should swallow and log their own errors so cache trouble only
//! ever degrades into rebuild-on-every-call.

use std::time::Duration;

pub mod memory;

pub use memory::MemoryCache;

/// Shared byte-oriented cache.
pub trait KvCache: Send + Sync {
    /// Fetch a value, or `None` on miss/expiry.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value. `ttl = None` keeps it until explicitly forgotten.
    fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);

    /// Drop a value if present.
    fn forget(&self, key: &str);
}
