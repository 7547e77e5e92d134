//! Pre-dispatch reply interception.
//!
//! Runs before normal command handling on every message-bearing update.
//! Rules:
//! 1. A command message discards any pending reply for the scope and is
//!    never intercepted; the new command always wins.
//! 2. Plain text with no pending state passes through untouched.
//! 3. Plain text with pending state consumes it exactly once: the record is
//!    removed from the store before anything else runs.

use crate::pending::{NextInput, PendingReply};
use crate::sinks::{DispatchSink, ReplyTarget};
use crate::store::ReplyStore;
use anyhow::Result;
use botshell_core::UpdateContext;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ReplyInterceptor {
    store: Arc<dyn ReplyStore>,
}

impl ReplyInterceptor {
    pub fn new(store: Arc<dyn ReplyStore>) -> Self {
        Self { store }
    }

    /// Returns `true` when the update was consumed as a reply and normal
    /// dispatch should not run.
    pub async fn intercept(
        &self,
        ctx: &UpdateContext,
        sink: &dyn DispatchSink,
        targets: &dyn ReplyTarget,
    ) -> Result<bool> {
        let Some(text) = ctx.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(false);
        };
        let Some(scope) = ctx.reply_scope() else {
            return Ok(false);
        };

        let pending = self.store.get(&scope);

        if ctx.is_command {
            if pending.is_some() {
                self.store.forget(&scope);
                debug!(scope, "discarded pending reply; a new command takes over");
            }
            return Ok(false);
        }

        let Some(pending) = pending else {
            return Ok(false);
        };

        // Consume exactly once, before acting on it.
        self.store.forget(&scope);

        match pending {
            PendingReply::Inspector { base_input, args, options, next, .. } => {
                let rebuilt =
                    rebuild_inspector_input(base_input.as_deref(), &args, &options, next.as_ref(), text);
                let Some(rebuilt) = rebuilt else {
                    debug!(scope, "pending inspector state is unusable; dropping reply");
                    return Ok(false);
                };
                info!(scope, input = %rebuilt, "re-dispatching completed command");
                sink.dispatch(ctx, &rebuilt).await?;
                Ok(true)
            }
            PendingReply::Custom { handler, payload, .. } => {
                if handler.is_empty() {
                    debug!(scope, "pending custom reply has no handler; dropping");
                    return Ok(false);
                }
                targets.on_reply(&handler, ctx, &payload, text).await
            }
        }
    }
}

/// Fold a reply into the stored partial command.
///
/// The reply fills the `next` slot: appended as the next positional argument
/// or, for an option step, as `--flag=value` with the flag normalized to its
/// long form. Returns `None` when the base command or the reply is missing.
pub fn rebuild_inspector_input(
    base: Option<&str>,
    args: &[String],
    options: &[String],
    next: Option<&NextInput>,
    reply: &str,
) -> Option<String> {
    let base = base.map(str::trim).filter(|b| !b.is_empty())?;
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    let mut args: Vec<String> = args.to_vec();
    let mut options: Vec<String> = options.to_vec();

    match next {
        Some(NextInput::Opt { name }) => {
            let flag = name.trim();
            if flag.is_empty() {
                return None;
            }
            let flag = if flag.starts_with("--") {
                flag.to_string()
            } else {
                format!("--{}", flag.trim_start_matches('-'))
            };
            options.push(format!("{flag}={reply}"));
        }
        // Missing `next` defaults to an argument step.
        Some(NextInput::Arg { .. }) | None => args.push(reply.to_string()),
    }

    let args_text = join_non_empty(&args);
    let opt_text = join_non_empty(&options);
    let line = [base.to_string(), args_text, opt_text]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some(line.trim().to_string())
}

fn join_non_empty(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
