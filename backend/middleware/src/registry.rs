//! Middleware behavior trait and its id-keyed registry.

use anyhow::Result;
use async_trait::async_trait;
use botshell_core::{UpdateContext, UpdateMeta};
use std::collections::HashMap;
use std::sync::Arc;

/// One unit of cross-cutting update processing.
///
/// The declaration methods say where the middleware wants to run; the
/// compiler reads them once at boot. Only [`handle`](Self::handle) runs
/// per update.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Event keys or group names to subscribe to. The key `command`
    /// targets resolved commands, scoped by [`commands`](Self::commands).
    fn events(&self) -> Vec<String> {
        Vec::new()
    }

    /// Command names for the `command` event. `None` or an empty list
    /// means every command.
    fn commands(&self) -> Option<Vec<String>> {
        None
    }

    /// Bots this middleware is limited to. `None` means every bot.
    fn for_bot(&self) -> Option<Vec<String>> {
        None
    }

    /// Process one update. Returning `false` stops the chain and the
    /// update goes no further.
    async fn handle(&self, ctx: &UpdateContext, meta: &UpdateMeta) -> Result<bool>;
}

/// Middleware implementations keyed by stable id.
#[derive(Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, middleware: Arc<dyn Middleware>) {
        self.entries.insert(id.into(), middleware);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Middleware>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered ids, sorted for deterministic iteration.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
