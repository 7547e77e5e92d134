//! Seams the interceptor uses to hand a collected reply back to the
//! command machinery without depending on it.

use anyhow::Result;
use async_trait::async_trait;
use botshell_core::UpdateContext;
use serde_json::Value;
use std::collections::BTreeMap;

/// Runs a synthetic command line through the full command pipeline, as if
/// the user had typed it.
#[async_trait]
pub trait DispatchSink: Send + Sync {
    async fn dispatch(&self, ctx: &UpdateContext, input: &str) -> Result<()>;
}

/// Routes a collected reply to a command's `on_reply` hook.
#[async_trait]
pub trait ReplyTarget: Send + Sync {
    /// Returns `false` when no handler is registered under this id; the
    /// reply is then treated as not handled.
    async fn on_reply(
        &self,
        handler: &str,
        ctx: &UpdateContext,
        payload: &BTreeMap<String, Value>,
        text: &str,
    ) -> Result<bool>;
}
