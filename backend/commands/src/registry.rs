//! Command registry: builds and owns the command tree.
//!
//! Descriptor names are split on `:` into a node chain; chains for
//! different commands merge into one forest. Only the final segment
//! carries the handler metadata, so `make:seed` and `make:model` share a
//! plain `make` group node. A command registered at a path that already
//! exists as a group turns that node into a hybrid, whichever order the
//! two were declared in.

use crate::descriptor::{CommandDescriptor, HandlerRegistry};
use crate::node::{CommandNode, NodeArena, NodeId};
use crate::pattern;
use crate::spec::{ArgumentSpec, OptionSpec};
use botshell_cache::KvCache;
use botshell_core::BotError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Cache key for the serialized registry snapshot.
pub const REGISTRY_CACHE_KEY: &str = "botshell:commands:registry";

/// Configuration mistakes found while building the command tree. All of
/// them abort the build.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown handler id: {0}")]
    UnknownHandler(String),
    #[error("empty command name for handler: {0}")]
    EmptyName(String),
    #[error("duplicate command at \"{path}\": {first} and {second}")]
    DuplicateCommand { path: String, first: String, second: String },
    #[error("command children cycle through handler: {0}")]
    ChildCycle(String),
}

impl From<RegistryError> for BotError {
    fn from(err: RegistryError) -> Self {
        BotError::Registry(err.to_string())
    }
}

/// The compiled command tree plus registry-wide options.
///
/// Built once per resolution context (or restored from cache) and read-only
/// afterwards; resolution never writes back into it.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    arena: NodeArena,
    roots: BTreeMap<String, NodeId>,
    global_options: Vec<OptionSpec>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// An empty registry carrying the built-in `--help` global option.
    pub fn new() -> Self {
        let mut help = OptionSpec::new("--help");
        help.short = Some("-h".into());
        help.description = Some("Display help for the command.".into());
        help.is_global = true;
        Self { arena: NodeArena::new(), roots: BTreeMap::new(), global_options: vec![help] }
    }

    pub fn roots(&self) -> &BTreeMap<String, NodeId> {
        &self.roots
    }

    pub fn global_options(&self) -> &[OptionSpec] {
        &self.global_options
    }

    pub fn node(&self, id: NodeId) -> &CommandNode {
        self.arena.node(id)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Full space-joined path of a node, e.g. `"make seed"`.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.arena.node(current);
            parts.push(node.name.clone());
            cursor = node.parent;
        }
        parts.reverse();
        parts.join(" ")
    }

    /// Build a registry from handler ids, pulling each descriptor through
    /// the handler registry. Declared children are ingested recursively
    /// beneath their parent's leaf.
    pub fn from_handlers(ids: &[String], handlers: &HandlerRegistry) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        let mut stack = Vec::new();
        for id in ids {
            registry.ingest(id, None, handlers, &mut stack)?;
        }
        Ok(registry)
    }

    /// Like [`from_handlers`](Self::from_handlers), but consults the cache
    /// first and saves a fresh build back under [`REGISTRY_CACHE_KEY`] with
    /// no expiry.
    pub fn from_handlers_cached(
        ids: &[String],
        handlers: &HandlerRegistry,
        cache: &dyn KvCache,
    ) -> Result<Self, RegistryError> {
        if let Some(bytes) = cache.get(REGISTRY_CACHE_KEY) {
            match serde_json::from_slice::<RegistrySnapshot>(&bytes) {
                Ok(snapshot) => {
                    debug!("command registry loaded from cache");
                    return Ok(Self::restore(snapshot));
                }
                Err(err) => warn!(%err, "discarding unreadable registry snapshot"),
            }
        }

        let registry = Self::from_handlers(ids, handlers)?;
        match serde_json::to_vec(&registry.export()) {
            Ok(bytes) => cache.put(REGISTRY_CACHE_KEY, bytes, None),
            Err(err) => warn!(%err, "failed to serialize command registry"),
        }
        Ok(registry)
    }

    /// Drop the cached snapshot so the next build recompiles from the
    /// handler registry.
    pub fn clear_cached(cache: &dyn KvCache) {
        cache.forget(REGISTRY_CACHE_KEY);
    }

    fn ingest(
        &mut self,
        id: &str,
        attach_to: Option<NodeId>,
        handlers: &HandlerRegistry,
        stack: &mut Vec<String>,
    ) -> Result<(), RegistryError> {
        if stack.iter().any(|seen| seen == id) {
            return Err(RegistryError::ChildCycle(id.to_string()));
        }
        let handler =
            handlers.get(id).ok_or_else(|| RegistryError::UnknownHandler(id.to_string()))?;
        let descriptor = handler.descriptor();

        let name = descriptor.name.trim().to_lowercase();
        let segments: Vec<&str> = name.split(':').filter(|s| !s.is_empty()).collect();
        let Some((first, rest)) = segments.split_first() else {
            return Err(RegistryError::EmptyName(id.to_string()));
        };

        let mut arguments = pattern::parse_arguments(&descriptor.pattern);
        for arg in &mut arguments {
            if let Some(help) = descriptor.argument_help.get(&arg.name) {
                arg.description = Some(help.clone());
            }
        }
        let mut options = pattern::parse_options(&descriptor.option_pattern);
        for opt in &mut options {
            if let Some(help) = descriptor.option_help.get(opt.key()) {
                opt.description = Some(help.clone());
            }
        }

        let mut node_id = self.child_or_create(attach_to, first);
        for segment in rest {
            node_id = self.child_or_create(Some(node_id), segment);
        }
        self.adopt_leaf(node_id, id, &descriptor, arguments, options)?;

        stack.push(id.to_string());
        for child in &descriptor.children {
            self.ingest(child, Some(node_id), handlers, stack)?;
        }
        stack.pop();

        Ok(())
    }

    /// Reuse the named child of `parent` (or root when `parent` is `None`),
    /// creating it as a plain group node when absent.
    fn child_or_create(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        let existing = match parent {
            Some(parent) => self.arena.node(parent).children.get(name).copied(),
            None => self.roots.get(name).copied(),
        };
        if let Some(id) = existing {
            return id;
        }

        let id = self.arena.alloc(CommandNode::new(name, parent));
        match parent {
            Some(parent) => {
                self.arena.node_mut(parent).children.insert(name.to_string(), id);
            }
            None => {
                self.roots.insert(name.to_string(), id);
            }
        }
        id
    }

    /// Apply leaf metadata to the node at the end of a chain.
    ///
    /// A node without a command key adopts the metadata, which covers a
    /// group that was materialized before its own command registered.
    /// Re-registering the same handler id is a no-op; two different
    /// handlers on one path is fatal.
    fn adopt_leaf(
        &mut self,
        id: NodeId,
        handler_id: &str,
        descriptor: &CommandDescriptor,
        arguments: Vec<ArgumentSpec>,
        options: Vec<OptionSpec>,
    ) -> Result<(), RegistryError> {
        let path = self.path_of(id);
        let node = self.arena.node_mut(id);

        match &node.command {
            Some(existing) if existing == handler_id => {
                debug!(path = %path, handler = handler_id, "command already registered; skipping");
                return Ok(());
            }
            Some(existing) => {
                return Err(RegistryError::DuplicateCommand {
                    path,
                    first: existing.clone(),
                    second: handler_id.to_string(),
                });
            }
            None => {}
        }

        node.command = Some(handler_id.to_string());
        node.description = descriptor.description.clone();
        node.arguments = arguments;
        node.options = options;
        node.prompt_overrides = descriptor.prompt_overrides.clone();
        node.prompt_variables = descriptor.prompt_variables.clone();
        Ok(())
    }

    fn export(&self) -> RegistrySnapshot {
        let nodes = self
            .roots
            .iter()
            .map(|(name, id)| (name.clone(), self.export_node(*id)))
            .collect();
        RegistrySnapshot { nodes, global_options: self.global_options.clone() }
    }

    fn export_node(&self, id: NodeId) -> SnapshotNode {
        let node = self.arena.node(id);
        SnapshotNode {
            name: node.name.clone(),
            description: node.description.clone(),
            command: node.command.clone(),
            arguments: node.arguments.clone(),
            options: node.options.clone(),
            children: node
                .children
                .iter()
                .map(|(name, child)| (name.clone(), self.export_node(*child)))
                .collect(),
            prompt_overrides: node.prompt_overrides.clone(),
            prompt_variables: node.prompt_variables.clone(),
        }
    }

    fn restore(snapshot: RegistrySnapshot) -> Self {
        let mut registry = Self::new();
        registry.global_options = snapshot.global_options;
        for (name, node) in snapshot.nodes {
            let id = registry.restore_node(node, None);
            registry.roots.insert(name, id);
        }
        registry
    }

    // Parent handles are not persisted; each node's parent is the caller
    // of this depth-first walk.
    fn restore_node(&mut self, snapshot: SnapshotNode, parent: Option<NodeId>) -> NodeId {
        let id = self.arena.alloc(CommandNode {
            name: snapshot.name,
            description: snapshot.description,
            command: snapshot.command,
            parent,
            arguments: snapshot.arguments,
            options: snapshot.options,
            children: BTreeMap::new(),
            prompt_overrides: snapshot.prompt_overrides,
            prompt_variables: snapshot.prompt_variables,
        });
        for (name, child) in snapshot.children {
            let child_id = self.restore_node(child, Some(id));
            self.arena.node_mut(id).children.insert(name, child_id);
        }
        id
    }
}

/// Persisted form of the registry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrySnapshot {
    nodes: BTreeMap<String, SnapshotNode>,
    global_options: Vec<OptionSpec>,
}

/// One persisted node; children are nested, parents implicit.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotNode {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    arguments: Vec<ArgumentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<OptionSpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, SnapshotNode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    prompt_overrides: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    prompt_variables: BTreeMap<String, BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{CommandHandler, Invocation};
    use anyhow::Result;
    use async_trait::async_trait;
    use botshell_cache::MemoryCache;
    use botshell_core::UpdateContext;
    use std::sync::Arc;

    struct Described(CommandDescriptor);

    #[async_trait]
    impl CommandHandler for Described {
        fn descriptor(&self) -> CommandDescriptor {
            self.0.clone()
        }

        async fn handle(&self, _ctx: &UpdateContext, _invocation: &Invocation) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn register(handlers: &mut HandlerRegistry, id: &str, descriptor: CommandDescriptor) {
        handlers.register(id, Arc::new(Described(descriptor)));
    }

    fn descriptor(name: &str) -> CommandDescriptor {
        let mut d = CommandDescriptor::new(name);
        d.description = Some(format!("The {name} command."));
        d
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builds_nested_tree() {
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "ping", descriptor("ping"));
        register(&mut handlers, "make:seed", {
            let mut d = descriptor("make:seed");
            d.pattern = "{name?}".into();
            d
        });
        register(&mut handlers, "make:model", descriptor("make:model"));

        let registry =
            CommandRegistry::from_handlers(&ids(&["ping", "make:seed", "make:model"]), &handlers)
                .unwrap();

        assert_eq!(registry.roots().len(), 2);
        let make = registry.roots()["make"];
        let make_node = registry.node(make);
        assert_eq!(make_node.command, None);
        assert_eq!(make_node.children.len(), 2);

        let seed = make_node.children["seed"];
        let seed_node = registry.node(seed);
        assert_eq!(seed_node.command.as_deref(), Some("make:seed"));
        assert_eq!(seed_node.arguments.len(), 1);
        assert!(seed_node.arguments[0].required);
        assert_eq!(registry.path_of(seed), "make seed");
    }

    #[test]
    fn names_are_lowercased_and_empty_segments_dropped() {
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "weird", descriptor("Make::Seed"));
        let registry = CommandRegistry::from_handlers(&ids(&["weird"]), &handlers).unwrap();

        let make = registry.roots()["make"];
        let seed = registry.node(make).children["seed"];
        assert_eq!(registry.path_of(seed), "make seed");
    }

    #[test]
    fn group_adopts_command_registered_later() {
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "make:seed", descriptor("make:seed"));
        register(&mut handlers, "make", {
            let mut d = descriptor("make");
            d.pattern = "{kind}".into();
            d
        });

        // The subcommand materializes "make" as a plain group first.
        let registry =
            CommandRegistry::from_handlers(&ids(&["make:seed", "make"]), &handlers).unwrap();
        let make = registry.roots()["make"];
        let node = registry.node(make);
        assert_eq!(node.command.as_deref(), Some("make"));
        assert_eq!(node.arguments.len(), 1);
        assert!(node.has_children());

        // The opposite declaration order lands in the same place.
        let reversed =
            CommandRegistry::from_handlers(&ids(&["make", "make:seed"]), &handlers).unwrap();
        let make = reversed.roots()["make"];
        assert_eq!(reversed.node(make).command.as_deref(), Some("make"));
        assert!(reversed.node(make).has_children());
    }

    #[test]
    fn duplicate_handlers_on_one_path_abort() {
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "first", descriptor("deploy"));
        register(&mut handlers, "second", descriptor("deploy"));

        let err = CommandRegistry::from_handlers(&ids(&["first", "second"]), &handlers).unwrap_err();
        match err {
            RegistryError::DuplicateCommand { path, first, second } => {
                assert_eq!(path, "deploy");
                assert_eq!(first, "first");
                assert_eq!(second, "second");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn same_handler_listed_twice_is_harmless() {
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "ping", descriptor("ping"));
        let registry =
            CommandRegistry::from_handlers(&ids(&["ping", "ping"]), &handlers).unwrap();
        assert_eq!(registry.roots().len(), 1);
    }

    #[test]
    fn unknown_and_empty_names_abort() {
        let handlers = HandlerRegistry::new();
        let err = CommandRegistry::from_handlers(&ids(&["ghost"]), &handlers).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownHandler(id) if id == "ghost"));

        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "blank", descriptor("::"));
        let err = CommandRegistry::from_handlers(&ids(&["blank"]), &handlers).unwrap_err();
        assert!(matches!(err, RegistryError::EmptyName(id) if id == "blank"));
    }

    #[test]
    fn declared_children_attach_under_the_leaf() {
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "user", {
            let mut d = descriptor("user");
            d.children = vec!["user:ban".into()];
            d
        });
        register(&mut handlers, "user:ban", descriptor("ban"));

        let registry = CommandRegistry::from_handlers(&ids(&["user"]), &handlers).unwrap();
        let user = registry.roots()["user"];
        let user_node = registry.node(user);
        assert_eq!(user_node.command.as_deref(), Some("user"));
        let ban = user_node.children["ban"];
        assert_eq!(registry.node(ban).command.as_deref(), Some("user:ban"));
        assert_eq!(registry.path_of(ban), "user ban");
    }

    #[test]
    fn child_cycles_abort() {
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "a", {
            let mut d = descriptor("a");
            d.children = vec!["b".into()];
            d
        });
        register(&mut handlers, "b", {
            let mut d = descriptor("b");
            d.children = vec!["a".into()];
            d
        });

        let err = CommandRegistry::from_handlers(&ids(&["a"]), &handlers).unwrap_err();
        assert!(matches!(err, RegistryError::ChildCycle(id) if id == "a"));
    }

    #[test]
    fn test_snapshot_round_trip_rebuilds_parents() {
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "make:seed", {
            let mut d = descriptor("make:seed");
            d.pattern = "{name?} {age?: \\d+}".into();
            d.option_pattern = "{force}".into();
            d.prompt_overrides = BTreeMap::from([("age".to_string(), "How old?".to_string())]);
            d
        });
        register(&mut handlers, "make:model", descriptor("make:model"));
        register(&mut handlers, "ping", descriptor("ping"));

        let built = CommandRegistry::from_handlers(
            &ids(&["make:seed", "make:model", "ping"]),
            &handlers,
        )
        .unwrap();

        let bytes = serde_json::to_vec(&built.export()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"globalOptions\""));
        assert!(text.contains("\"promptOverrides\""));

        let restored = CommandRegistry::restore(serde_json::from_slice(&bytes).unwrap());

        // Walking every leaf back to its root must give the same paths.
        fn leaves(registry: &CommandRegistry, id: NodeId, out: &mut Vec<String>) {
            let node = registry.node(id);
            if node.is_leaf() {
                out.push(registry.path_of(id));
            }
            for child in node.children.values() {
                leaves(registry, *child, out);
            }
        }

        let mut original = Vec::new();
        let mut round_tripped = Vec::new();
        for id in built.roots().values() {
            leaves(&built, *id, &mut original);
        }
        for id in restored.roots().values() {
            leaves(&restored, *id, &mut round_tripped);
        }
        original.sort();
        round_tripped.sort();
        assert_eq!(original, round_tripped);
        assert_eq!(original, vec!["make model", "make seed", "ping"]);

        let seed = restored.node(restored.roots()["make"]).children["seed"];
        let seed_node = restored.node(seed);
        assert_eq!(seed_node.arguments.len(), 2);
        assert_eq!(seed_node.options.len(), 1);
        assert_eq!(seed_node.prompt_overrides["age"], "How old?");
    }

    #[test]
    fn cached_build_short_circuits() {
        let cache = MemoryCache::new();
        let mut handlers = HandlerRegistry::new();
        register(&mut handlers, "ping", descriptor("ping"));

        let first =
            CommandRegistry::from_handlers_cached(&ids(&["ping"]), &handlers, &cache).unwrap();
        assert!(first.roots().contains_key("ping"));
        assert!(cache.get(REGISTRY_CACHE_KEY).is_some());

        // A later build with different handlers still reads the snapshot.
        let mut other = HandlerRegistry::new();
        register(&mut other, "pong", descriptor("pong"));
        let second =
            CommandRegistry::from_handlers_cached(&ids(&["pong"]), &other, &cache).unwrap();
        assert!(second.roots().contains_key("ping"));
        assert!(!second.roots().contains_key("pong"));

        CommandRegistry::clear_cached(&cache);
        let third =
            CommandRegistry::from_handlers_cached(&ids(&["pong"]), &other, &cache).unwrap();
        assert!(third.roots().contains_key("pong"));
    }

    #[test]
    fn global_help_option_is_marked_global() {
        let registry = CommandRegistry::new();
        let help = &registry.global_options()[0];
        assert_eq!(help.long, "--help");
        assert_eq!(help.short.as_deref(), Some("-h"));
        assert!(help.is_global);
        assert!(!help.required);
    }
}
