//! Shared traits implemented at the edges of the runtime.

use crate::context::UpdateContext;
use anyhow::Result;
use async_trait::async_trait;

/// Outbound delivery of rendered text back to the conversation.
///
/// The command layer never talks to the chat platform directly; everything
/// it wants to say goes through this seam. Tests plug in a recording fake.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, ctx: &UpdateContext, text: &str) -> Result<()>;
}
