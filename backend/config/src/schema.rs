//! Botshell configuration schema.
//!
//! Typed view of the YAML operators write: bot roster, console behavior,
//! command lists, and middleware attachments. The middleware sections are
//! deliberately loose in the file (plain ids, scoped rules, per-command
//! maps) and appear here as untagged unions; the authoring normalizer
//! gives them their strict meaning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for a botshell deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotshellConfig {
    /// Bot served when the caller does not name one.
    #[serde(default = "default_bot_name")]
    pub default_bot: String,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub console: ConsoleConfig,

    /// Named bots and their wiring.
    #[serde(default)]
    pub bots: BTreeMap<String, BotConfig>,

    /// Command entries every bot inherits unless it lists its own.
    /// Entries may be handler ids, shared keys, or group names.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Named command groups; members may reference other groups.
    #[serde(default)]
    pub command_groups: BTreeMap<String, Vec<String>>,

    /// Alias key → handler id.
    #[serde(default)]
    pub shared_commands: BTreeMap<String, String>,

    /// Global middleware attachments, keyed by event, event group, or
    /// `command`.
    #[serde(default)]
    pub middleware: BTreeMap<String, GlobalMiddlewareEntry>,
}

impl Default for BotshellConfig {
    fn default() -> Self {
        Self {
            default_bot: default_bot_name(),
            cache: CacheConfig::default(),
            console: ConsoleConfig::default(),
            bots: BTreeMap::new(),
            commands: Vec::new(),
            command_groups: BTreeMap::new(),
            shared_commands: BTreeMap::new(),
            middleware: BTreeMap::new(),
        }
    }
}

/// Cache behavior for compiled artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Reuse the command registry snapshot across boots.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Console resolver and help behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Dictionary language served to users.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Extra dictionary folders, scanned in order after the built-ins.
    #[serde(default)]
    pub lang_paths: Vec<String>,

    /// Seconds a pending reply stays answerable.
    #[serde(default = "default_reply_ttl")]
    pub listen_reply_ttl: u64,

    /// Tokens that request help when present anywhere in the input.
    /// Empty keeps the built-in `--help`/`-h` pair.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub help_flags: Vec<String>,

    /// Ask for the first missing argument or option instead of replying
    /// with the static usage error.
    #[serde(default = "default_true")]
    pub interactive_prompts: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            lang_paths: Vec::new(),
            listen_reply_ttl: default_reply_ttl(),
            help_flags: Vec::new(),
            interactive_prompts: true,
        }
    }
}

/// One named bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Command entries for this bot. Empty falls back to the global list.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Per-bot middleware, keyed like the global section. Strict shape:
    /// plain ids only, no scoping rules.
    #[serde(default)]
    pub middleware: BTreeMap<String, BotMiddlewareEntry>,
}

// ---------------------------------------------------------------------------
// Middleware authoring shapes
// ---------------------------------------------------------------------------

/// Value under one event key in a bot's `middleware` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BotMiddlewareEntry {
    /// `message: [auditLog, rateLimit]`
    Ids(Vec<String>),
    /// `command: { start: [auditLog] }`
    Commands(BTreeMap<String, Vec<String>>),
}

/// Value under one event key in the global `middleware` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GlobalMiddlewareEntry {
    /// `message: [auditLog, { id: rateLimit, forBot: main }]`
    Items(Vec<GlobalMiddlewareItem>),
    /// `command: { start: [auditLog] }`
    Commands(BTreeMap<String, Vec<GlobalMiddlewareItem>>),
}

/// One item in a global middleware list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GlobalMiddlewareItem {
    Id(String),
    Rule(GlobalMiddlewareRule),
}

/// A global middleware item scoped to specific bots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMiddlewareRule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_bot: Option<ForBot>,
}

/// Bot scope written either as one name or a list of names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForBot {
    One(String),
    Many(Vec<String>),
}

impl ForBot {
    /// Normalized bot list: trimmed, empties dropped, `None` when nothing
    /// usable remains.
    pub fn to_list(&self) -> Option<Vec<String>> {
        let names: Vec<String> = match self {
            ForBot::One(name) => vec![name.clone()],
            ForBot::Many(names) => names.clone(),
        };
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names)
        }
    }
}

fn default_bot_name() -> String {
    "main".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_reply_ttl() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gets_defaults() {
        let config: BotshellConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.default_bot, "main");
        assert!(config.cache.enabled);
        assert_eq!(config.console.lang, "en");
        assert_eq!(config.console.listen_reply_ttl, 120);
        assert!(config.console.interactive_prompts);
        assert!(config.bots.is_empty());
        assert!(config.commands.is_empty());
    }

    #[test]
    fn default_matches_deserialized_empty() {
        let parsed: BotshellConfig = serde_yaml::from_str("{}").unwrap();
        let built = BotshellConfig::default();
        assert_eq!(parsed.default_bot, built.default_bot);
        assert_eq!(parsed.console.lang, built.console.lang);
        assert_eq!(parsed.console.listen_reply_ttl, built.console.listen_reply_ttl);
    }

    #[test]
    fn test_full_document_round_trips() {
        let yaml = r#"
defaultBot: support
console:
  lang: id
  langPaths: ["lang/custom"]
  listenReplyTtl: 300
  helpFlags: ["--help", "-h", "--ayuda"]
  interactivePrompts: false
bots:
  support:
    commands: [greet, admin-tools]
    middleware:
      message: [auditLog]
      command:
        start: [rateLimit]
commands: [ping]
commandGroups:
  admin-tools: [ban, unban]
sharedCommands:
  hello: greet
middleware:
  messages: [auditLog]
"#;
        let config: BotshellConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.default_bot, "support");
        assert_eq!(config.console.lang, "id");
        assert_eq!(config.console.listen_reply_ttl, 300);
        assert!(!config.console.interactive_prompts);
        assert_eq!(config.console.help_flags.len(), 3);
        assert_eq!(config.bots["support"].commands, vec!["greet", "admin-tools"]);
        assert_eq!(config.command_groups["admin-tools"], vec!["ban", "unban"]);
        assert_eq!(config.shared_commands["hello"], "greet");

        let back = serde_yaml::to_string(&config).unwrap();
        let reparsed: BotshellConfig = serde_yaml::from_str(&back).unwrap();
        assert_eq!(reparsed.default_bot, config.default_bot);
        assert_eq!(reparsed.bots.len(), config.bots.len());
    }

    #[test]
    fn bot_middleware_shapes_are_discriminated() {
        let yaml = r#"
message: [a, b]
command:
  start: [c]
"#;
        let section: BTreeMap<String, BotMiddlewareEntry> = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(section["message"], BotMiddlewareEntry::Ids(_)));
        assert!(matches!(section["command"], BotMiddlewareEntry::Commands(_)));
    }

    #[test]
    fn global_items_accept_ids_and_rules() {
        let yaml = r#"
message:
  - auditLog
  - id: rateLimit
    forBot: main
  - id: quota
    forBot: [main, support]
"#;
        let section: BTreeMap<String, GlobalMiddlewareEntry> = serde_yaml::from_str(yaml).unwrap();
        let GlobalMiddlewareEntry::Items(items) = &section["message"] else {
            panic!("expected an item list");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], GlobalMiddlewareItem::Id(id) if id == "auditLog"));
        let GlobalMiddlewareItem::Rule(rule) = &items[1] else {
            panic!("expected a rule");
        };
        assert_eq!(rule.for_bot.as_ref().unwrap().to_list(), Some(vec!["main".to_string()]));
        let GlobalMiddlewareItem::Rule(rule) = &items[2] else {
            panic!("expected a rule");
        };
        assert_eq!(
            rule.for_bot.as_ref().unwrap().to_list(),
            Some(vec!["main".to_string(), "support".to_string()])
        );
    }

    #[test]
    fn blank_for_bot_normalizes_to_none() {
        assert_eq!(ForBot::One("  ".into()).to_list(), None);
        assert_eq!(ForBot::Many(vec![" ".into(), String::new()]).to_list(), None);
        assert_eq!(
            ForBot::Many(vec![" main ".into()]).to_list(),
            Some(vec!["main".to_string()])
        );
    }
}
