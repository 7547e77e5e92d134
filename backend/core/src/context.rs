//! Per-update context.
//!
//! Built once when an update enters the pipeline and passed explicitly to
//! every stage. Command detection happens here so downstream code never
//! re-parses the raw text.

use crate::event::UpdateEvent;
use crate::update::IncomingMessage;
use serde::{Deserialize, Serialize};

/// Snapshot of the update currently being handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContext {
    /// Name of the bot this update was delivered to.
    pub bot: String,
    pub event: UpdateEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<IncomingMessage>,
    /// Message text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// True when the text is a slash command.
    pub is_command: bool,
    /// First command token, lowercased, without the slash or `@bot` suffix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_name: Option<String>,
}

impl UpdateContext {
    /// Build a context from a message-bearing update.
    pub fn from_message(bot: impl Into<String>, event: UpdateEvent, message: IncomingMessage) -> Self {
        let text = message.text().map(|t| t.to_string());
        let (is_command, command_name) = detect_command(text.as_deref());
        Self {
            bot: bot.into(),
            event,
            message: Some(message),
            text,
            is_command,
            command_name,
        }
    }

    /// Build a context for an update with no message payload.
    pub fn bare(bot: impl Into<String>, event: UpdateEvent) -> Self {
        Self {
            bot: bot.into(),
            event,
            message: None,
            text: None,
            is_command: false,
            command_name: None,
        }
    }

    /// Derive a sibling context carrying synthetic command text, used when a
    /// collected reply is folded back into a full command line.
    pub fn with_synthetic_text(&self, text: impl Into<String>) -> Self {
        let text = text.into();
        let normalized = if text.trim_start().starts_with('/') {
            text
        } else {
            format!("/{}", text.trim_start())
        };
        let (is_command, command_name) = detect_command(Some(&normalized));
        Self {
            bot: self.bot.clone(),
            event: self.event,
            message: self.message.clone(),
            text: Some(normalized),
            is_command,
            command_name,
        }
    }

    /// Conversation+sender scope key, used to address pending-reply state.
    ///
    /// Returns `None` when either identity is missing (anonymous channel
    /// posts, non-message updates), which disables per-scope features.
    pub fn reply_scope(&self) -> Option<String> {
        let message = self.message.as_ref()?;
        let user = message.from.as_ref()?;
        Some(format!("chat:{}:user:{}", message.chat.id, user.id))
    }
}

/// Detect a slash command and extract its name.
///
/// The name is the first whitespace token with the leading `/` removed,
/// anything from the first `@` on dropped, and the rest lowercased.
fn detect_command(text: Option<&str>) -> (bool, Option<String>) {
    let Some(text) = text else {
        return (false, None);
    };
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return (false, None);
    }
    let first = trimmed.split_whitespace().next().unwrap_or("");
    let mut name = first.trim_start_matches('/');
    if let Some(at) = name.find('@') {
        name = &name[..at];
    }
    let name = name.to_lowercase();
    if name.is_empty() {
        (true, None)
    } else {
        (true, Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::{Chat, ChatKind, User};

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage {
            message_id: 10,
            chat: Chat { id: 77, kind: ChatKind::Private, title: None },
            from: Some(User { id: 42, username: Some("jhon".into()), first_name: None }),
            text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_detects_command_name() {
        let ctx = UpdateContext::from_message("main", UpdateEvent::Message, message("/Make:Seed jhon"));
        assert!(ctx.is_command);
        assert_eq!(ctx.command_name.as_deref(), Some("make:seed"));
    }

    #[test]
    fn strips_bot_mention_from_name() {
        let ctx = UpdateContext::from_message("main", UpdateEvent::Message, message("/start@MyBot now"));
        assert_eq!(ctx.command_name.as_deref(), Some("start"));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        let ctx = UpdateContext::from_message("main", UpdateEvent::Message, message("hello there"));
        assert!(!ctx.is_command);
        assert_eq!(ctx.command_name, None);
    }

    #[test]
    fn test_reply_scope() {
        let ctx = UpdateContext::from_message("main", UpdateEvent::Message, message("hi"));
        assert_eq!(ctx.reply_scope().as_deref(), Some("chat:77:user:42"));
    }

    #[test]
    fn scope_missing_without_sender() {
        let mut msg = message("hi");
        msg.from = None;
        let ctx = UpdateContext::from_message("main", UpdateEvent::ChannelPost, msg);
        assert_eq!(ctx.reply_scope(), None);
        assert_eq!(UpdateContext::bare("main", UpdateEvent::Poll).reply_scope(), None);
    }

    #[test]
    fn synthetic_text_gains_slash_and_name() {
        let ctx = UpdateContext::from_message("main", UpdateEvent::Message, message("jhon"));
        let synth = ctx.with_synthetic_text("make:seed jhon");
        assert!(synth.is_command);
        assert_eq!(synth.text.as_deref(), Some("/make:seed jhon"));
        assert_eq!(synth.command_name.as_deref(), Some("make:seed"));
    }
}
