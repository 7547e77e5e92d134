//! Custom-mode listen helper for commands.
//!
//! A command that wants the user's next plain-text message calls
//! [`ReplyListener::listen`]; the reply is later routed to its `on_reply`
//! hook together with the stored payload.

use crate::pending::PendingReply;
use crate::store::ReplyStore;
use botshell_core::UpdateContext;
use botshell_i18n::Dictionary;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct ReplyListener {
    store: Arc<dyn ReplyStore>,
    default_ttl: Duration,
}

impl ReplyListener {
    pub fn new(store: Arc<dyn ReplyStore>, default_ttl: Duration) -> Self {
        let default_ttl = if default_ttl < Duration::from_secs(1) {
            Duration::from_secs(120)
        } else {
            default_ttl
        };
        Self { store, default_ttl }
    }

    /// Arm a custom-mode pending reply for the current scope.
    ///
    /// Does nothing when the scope cannot be computed (no sender identity).
    /// Returns `true` when the pending state was stored.
    pub fn listen(
        &self,
        ctx: &UpdateContext,
        handler: &str,
        payload: BTreeMap<String, Value>,
        ttl: Option<Duration>,
    ) -> bool {
        let Some(scope) = ctx.reply_scope() else {
            debug!(bot = %ctx.bot, "listen skipped; no scope for this update");
            return false;
        };
        let pending = PendingReply::Custom {
            scope: scope.clone(),
            handler: handler.to_string(),
            payload,
        };
        self.store.put(&scope, &pending, ttl.unwrap_or(self.default_ttl));
        true
    }

    /// Like [`listen`](Self::listen) but also resolves a localized prompt
    /// the caller should send. Returns `None` when nothing was stored or
    /// the prompt key resolves to empty text.
    pub fn listen_with_prompt(
        &self,
        ctx: &UpdateContext,
        handler: &str,
        payload: BTreeMap<String, Value>,
        dict: &Dictionary,
        prompt_key: &str,
        ttl: Option<Duration>,
    ) -> Option<String> {
        if !self.listen(ctx, handler, payload, ttl) {
            return None;
        }
        let text = dict.text(prompt_key);
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CacheReplyStore;
    use botshell_cache::MemoryCache;
    use botshell_core::{Chat, ChatKind, IncomingMessage, UpdateEvent, User};

    fn ctx_with_sender(from: Option<User>) -> UpdateContext {
        UpdateContext::from_message(
            "main",
            UpdateEvent::Message,
            IncomingMessage {
                message_id: 1,
                chat: Chat { id: 5, kind: ChatKind::Private, title: None },
                from,
                text: Some("/survey".into()),
            },
        )
    }

    fn listener() -> (ReplyListener, Arc<CacheReplyStore>) {
        let store = Arc::new(CacheReplyStore::new(Arc::new(MemoryCache::new())));
        (ReplyListener::new(store.clone(), Duration::from_secs(120)), store)
    }

    #[test]
    fn test_listen_stores_custom_pending() {
        let (listener, store) = listener();
        let ctx = ctx_with_sender(Some(User { id: 3, username: None, first_name: None }));
        assert!(listener.listen(&ctx, "survey", BTreeMap::new(), None));

        match store.get("chat:5:user:3") {
            Some(PendingReply::Custom { handler, .. }) => assert_eq!(handler, "survey"),
            other => panic!("unexpected pending state: {other:?}"),
        }
    }

    #[test]
    fn missing_scope_is_a_silent_no_op() {
        let (listener, store) = listener();
        let ctx = ctx_with_sender(None);
        assert!(!listener.listen(&ctx, "survey", BTreeMap::new(), None));
        assert_eq!(store.get("chat:5:user:3"), None);
    }

    #[test]
    fn prompt_resolves_through_dictionary() {
        let (listener, _) = listener();
        let ctx = ctx_with_sender(Some(User { id: 3, username: None, first_name: None }));
        let dict = Dictionary::from_value(serde_json::json!({
            "survey": { "ask_color": "What is your favorite color?" },
        }))
        .unwrap();

        let prompt = listener.listen_with_prompt(&ctx, "survey", BTreeMap::new(), &dict, "survey.ask_color", None);
        assert_eq!(prompt.as_deref(), Some("What is your favorite color?"));

        let none = listener.listen_with_prompt(&ctx, "survey", BTreeMap::new(), &dict, "survey.unknown", None);
        assert_eq!(none, None);
    }
}
