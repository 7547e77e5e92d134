//! Command descriptors and the handler capability trait.
//!
//! A command contributes two things: a declarative [`CommandDescriptor`]
//! the registry compiles into the tree, and a [`CommandHandler`] carrying
//! its behavior. Handlers are addressed everywhere by a stable string id,
//! never by type.

use crate::pattern::OptionValue;
use crate::spec::ArgumentSpec;
use anyhow::Result;
use async_trait::async_trait;
use botshell_core::{UpdateContext, UpdateMeta};
use botshell_reply::ReplyTarget;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Declarative shape of a command, consumed by the registry build.
#[derive(Debug, Clone, Default)]
pub struct CommandDescriptor {
    /// Command path, segments joined by `:` (e.g. `"make:seed"`).
    pub name: String,
    pub description: Option<String>,
    /// Argument pattern, e.g. `"{name?} {age?: \d+}"`.
    pub pattern: String,
    /// Option pattern, same grammar.
    pub option_pattern: String,
    /// Per-argument help text, keyed by argument name.
    pub argument_help: BTreeMap<String, String>,
    /// Per-option help text, keyed by long flag without dashes.
    pub option_help: BTreeMap<String, String>,
    /// Handler ids ingested as children beneath this command's leaf.
    pub children: Vec<String>,
    /// Prompt template overrides, keyed by argument or option name.
    pub prompt_overrides: BTreeMap<String, String>,
    /// Extra placeholder values for prompt templates.
    pub prompt_variables: BTreeMap<String, BTreeMap<String, String>>,
}

impl CommandDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

/// A fully validated command call, handed to the handler.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Resolved node path, space-joined (e.g. `"make seed"`).
    pub path: String,
    /// Bound argument specs, values filled in declaration order.
    pub args: Vec<ArgumentSpec>,
    /// Consumable option values keyed by long flag without dashes.
    pub options: BTreeMap<String, OptionValue>,
}

impl Invocation {
    /// Value of a positional argument, by name.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.iter().find(|a| a.name == name).and_then(|a| a.value.as_deref())
    }

    /// Textual value of an option, by key.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_text())
    }

    /// True when the option was presented, with or without a value.
    pub fn switch(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }
}

/// Behavior of one command.
///
/// Only [`descriptor`](Self::descriptor) and [`handle`](Self::handle) have
/// to be written; the rest are capability hooks with workable defaults.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// The declarative shape the registry ingests.
    fn descriptor(&self) -> CommandDescriptor;

    /// Pure gate consulted before resolution proceeds and while rendering
    /// command lists. No I/O; the default allows everyone.
    fn authorize(&self, _meta: &UpdateMeta) -> bool {
        true
    }

    /// Run the command. `Some(text)` is sent back to the conversation.
    async fn handle(&self, ctx: &UpdateContext, invocation: &Invocation) -> Result<Option<String>>;

    /// Receives the text of a custom-mode reply this command armed earlier.
    /// The default ignores it.
    async fn on_reply(
        &self,
        _ctx: &UpdateContext,
        _payload: &BTreeMap<String, Value>,
        _text: &str,
    ) -> Result<()> {
        Ok(())
    }
}

/// Handlers keyed by stable id.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(id.into(), handler);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(id)
    }

    /// Registered ids, sorted so registry builds are deterministic.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.handlers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[async_trait]
impl ReplyTarget for HandlerRegistry {
    async fn on_reply(
        &self,
        handler: &str,
        ctx: &UpdateContext,
        payload: &BTreeMap<String, Value>,
        text: &str,
    ) -> Result<bool> {
        let Some(target) = self.handlers.get(handler) else {
            debug!(handler, "reply for unknown handler dropped");
            return Ok(false);
        };
        target.on_reply(ctx, payload, text).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botshell_core::UpdateEvent;
    use std::sync::Mutex;

    struct Echo {
        replies: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandHandler for Echo {
        fn descriptor(&self) -> CommandDescriptor {
            CommandDescriptor::new("echo")
        }

        async fn handle(&self, _ctx: &UpdateContext, invocation: &Invocation) -> Result<Option<String>> {
            Ok(invocation.arg("text").map(|t| t.to_string()))
        }

        async fn on_reply(
            &self,
            _ctx: &UpdateContext,
            _payload: &BTreeMap<String, Value>,
            text: &str,
        ) -> Result<()> {
            self.replies.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn ctx() -> UpdateContext {
        UpdateContext::bare("main", UpdateEvent::Message)
    }

    #[test]
    fn test_invocation_accessors() {
        let mut arg = ArgumentSpec::new("text");
        arg.value = Some("hello".into());
        let invocation = Invocation {
            path: "echo".into(),
            args: vec![arg],
            options: BTreeMap::from([
                ("force".to_string(), OptionValue::Flag(true)),
                ("queue".to_string(), OptionValue::Text("high".into())),
            ]),
        };

        assert_eq!(invocation.arg("text"), Some("hello"));
        assert_eq!(invocation.arg("missing"), None);
        assert_eq!(invocation.option("queue"), Some("high"));
        assert_eq!(invocation.option("force"), None);
        assert!(invocation.switch("force"));
        assert!(!invocation.switch("missing"));
    }

    #[test]
    fn authorize_defaults_to_allow() {
        let handler = Echo { replies: Mutex::new(Vec::new()) };
        assert!(handler.authorize(&UpdateMeta::default()));
    }

    #[tokio::test]
    async fn reply_target_routes_by_id() {
        let echo = Arc::new(Echo { replies: Mutex::new(Vec::new()) });
        let mut registry = HandlerRegistry::new();
        registry.register("echo", echo.clone());

        let handled = registry.on_reply("echo", &ctx(), &BTreeMap::new(), "blue").await.unwrap();
        assert!(handled);
        assert_eq!(*echo.replies.lock().unwrap(), vec!["blue".to_string()]);

        let unknown = registry.on_reply("nope", &ctx(), &BTreeMap::new(), "x").await.unwrap();
        assert!(!unknown);
    }

    #[test]
    fn ids_come_back_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register("zeta", Arc::new(Echo { replies: Mutex::new(Vec::new()) }));
        registry.register("alpha", Arc::new(Echo { replies: Mutex::new(Vec::new()) }));
        assert_eq!(registry.ids(), vec!["alpha".to_string(), "zeta".to_string()]);
        assert_eq!(registry.len(), 2);
    }
}
