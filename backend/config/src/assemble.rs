//! Command roster assembly.
//!
//! Commands declared in code are merged into the config's command lists,
//! then each bot's entries (handler ids, shared keys, group names) expand
//! into the flat id list the command registry builds from.

use crate::schema::BotshellConfig;
use botshell_core::BotError;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

/// Fatal roster errors. Any of these aborts boot.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("shared command key `{key}` maps to both `{first}` and `{second}`")]
    SharedKeyConflict {
        key: String,
        first: String,
        second: String,
    },

    #[error("unknown command reference `{0}`")]
    UnknownCommand(String),

    #[error("command group `{0}` is part of a reference cycle")]
    GroupCycle(String),
}

impl From<ConfigError> for BotError {
    fn from(err: ConfigError) -> Self {
        BotError::Config(err.to_string())
    }
}

/// A command contributed from code rather than the config file.
#[derive(Debug, Clone, Default)]
pub struct DeclaredCommand {
    /// Stable handler id.
    pub id: String,
    /// Alias key other entries can use instead of the id.
    pub shared_as: Option<String>,
    /// Group names this command joins.
    pub groups: Vec<String>,
    /// Bots that receive it; `None` adds it to the global list.
    pub for_bot: Option<Vec<String>>,
}

impl DeclaredCommand {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    pub fn shared_as(mut self, key: impl Into<String>) -> Self {
        self.shared_as = Some(key.into());
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn for_bot(mut self, bot: impl Into<String>) -> Self {
        self.for_bot.get_or_insert_with(Vec::new).push(bot.into());
        self
    }
}

/// Merge code-declared commands into the config's lists.
///
/// The reference written into lists is the shared key when one is set,
/// the id otherwise. Entries already present in the file keep their
/// position; nothing is added twice.
pub fn merge_declared(
    config: &mut BotshellConfig,
    declared: &[DeclaredCommand],
) -> Result<(), ConfigError> {
    for command in declared {
        let id = command.id.trim().to_string();
        if id.is_empty() {
            debug!("declared command with empty id skipped");
            continue;
        }

        let mut reference = id.clone();
        if let Some(key) = command.shared_as.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            match config.shared_commands.get(key) {
                Some(existing) if existing != &id => {
                    return Err(ConfigError::SharedKeyConflict {
                        key: key.to_string(),
                        first: existing.clone(),
                        second: id,
                    });
                }
                _ => {
                    config.shared_commands.insert(key.to_string(), id.clone());
                }
            }
            reference = key.to_string();
        }

        for group in &command.groups {
            let group = group.trim();
            if group.is_empty() {
                continue;
            }
            let members = config.command_groups.entry(group.to_string()).or_default();
            if !members.contains(&reference) {
                members.push(reference.clone());
            }
        }

        match &command.for_bot {
            None => {
                if !config.commands.contains(&reference) {
                    config.commands.push(reference.clone());
                }
            }
            Some(bots) => {
                for bot in bots {
                    let bot = bot.trim();
                    if bot.is_empty() {
                        continue;
                    }
                    let entry = config.bots.entry(bot.to_string()).or_default();
                    if !entry.commands.contains(&reference) {
                        entry.commands.push(reference.clone());
                    }
                }
            }
        }
    }
    Ok(())
}

/// Expand one list of command entries into a flat, deduped handler id list.
///
/// Each entry resolves in this order: command group, shared key, handler
/// id. Groups may nest. Unknown references and group cycles abort.
pub fn assemble_commands(
    entries: &[String],
    config: &BotshellConfig,
    known_ids: &BTreeSet<String>,
) -> Result<Vec<String>, ConfigError> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    let mut visiting = Vec::new();
    for entry in entries {
        expand_entry(entry, config, known_ids, &mut out, &mut seen, &mut visiting)?;
    }
    Ok(out)
}

/// The command entries a bot resolves: its own list, or the global list
/// when it has none.
pub fn commands_for_bot(
    config: &BotshellConfig,
    bot: &str,
    known_ids: &BTreeSet<String>,
) -> Result<Vec<String>, ConfigError> {
    let entries = config
        .bots
        .get(bot)
        .filter(|bot_config| !bot_config.commands.is_empty())
        .map(|bot_config| bot_config.commands.as_slice())
        .unwrap_or(&config.commands);
    assemble_commands(entries, config, known_ids)
}

fn expand_entry(
    entry: &str,
    config: &BotshellConfig,
    known_ids: &BTreeSet<String>,
    out: &mut Vec<String>,
    seen: &mut BTreeSet<String>,
    visiting: &mut Vec<String>,
) -> Result<(), ConfigError> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Ok(());
    }

    if let Some(members) = config.command_groups.get(entry) {
        if visiting.iter().any(|group| group == entry) {
            return Err(ConfigError::GroupCycle(entry.to_string()));
        }
        visiting.push(entry.to_string());
        for member in members {
            expand_entry(member, config, known_ids, out, seen, visiting)?;
        }
        visiting.pop();
        return Ok(());
    }

    let id = config.shared_commands.get(entry).map(String::as_str).unwrap_or(entry);
    if !known_ids.contains(id) {
        return Err(ConfigError::UnknownCommand(entry.to_string()));
    }
    if seen.insert(id.to_string()) {
        out.push(id.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_merge_places_declared_commands() {
        let mut config = BotshellConfig::default();
        let declared = vec![
            DeclaredCommand::new("greet"),
            DeclaredCommand::new("ban").in_group("admin"),
            DeclaredCommand::new("stats").for_bot("support"),
        ];

        merge_declared(&mut config, &declared).unwrap();
        assert_eq!(config.commands, vec!["greet", "ban"]);
        assert_eq!(config.command_groups["admin"], vec!["ban"]);
        assert_eq!(config.bots["support"].commands, vec!["stats"]);
    }

    #[test]
    fn shared_key_becomes_the_listed_reference() {
        let mut config = BotshellConfig::default();
        let declared = vec![DeclaredCommand::new("greet").shared_as("hello").in_group("social")];

        merge_declared(&mut config, &declared).unwrap();
        assert_eq!(config.shared_commands["hello"], "greet");
        assert_eq!(config.commands, vec!["hello"]);
        assert_eq!(config.command_groups["social"], vec!["hello"]);
    }

    #[test]
    fn shared_key_conflict_aborts() {
        let mut config = BotshellConfig::default();
        config.shared_commands.insert("hello".into(), "wave".into());

        let declared = vec![DeclaredCommand::new("greet").shared_as("hello")];
        let err = merge_declared(&mut config, &declared).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SharedKeyConflict { ref key, ref first, ref second }
                if key == "hello" && first == "wave" && second == "greet"
        ));
    }

    #[test]
    fn repeated_shared_mapping_is_harmless() {
        let mut config = BotshellConfig::default();
        config.shared_commands.insert("hello".into(), "greet".into());
        config.commands.push("hello".into());

        merge_declared(&mut config, &[DeclaredCommand::new("greet").shared_as("hello")]).unwrap();
        assert_eq!(config.commands, vec!["hello"]);
        assert_eq!(config.command_groups.len(), 0);
    }

    #[test]
    fn file_entries_keep_their_position() {
        let mut config = BotshellConfig::default();
        config.commands = vec!["ping".into()];

        merge_declared(&mut config, &[DeclaredCommand::new("greet")]).unwrap();
        assert_eq!(config.commands, vec!["ping", "greet"]);
    }

    #[test]
    fn test_assemble_resolves_ids_keys_and_groups() {
        let mut config = BotshellConfig::default();
        config.shared_commands.insert("hello".into(), "greet".into());
        config.command_groups.insert("admin".into(), vec!["ban".into(), "unban".into()]);

        let entries = vec!["ping".to_string(), "hello".to_string(), "admin".to_string()];
        let ids = assemble_commands(&entries, &config, &known(&["ping", "greet", "ban", "unban"]))
            .unwrap();
        assert_eq!(ids, vec!["ping", "greet", "ban", "unban"]);
    }

    #[test]
    fn nested_groups_flatten_in_order() {
        let mut config = BotshellConfig::default();
        config.command_groups.insert("all".into(), vec!["social".into(), "ban".into()]);
        config.command_groups.insert("social".into(), vec!["greet".into()]);

        let ids = assemble_commands(
            &["all".to_string()],
            &config,
            &known(&["greet", "ban"]),
        )
        .unwrap();
        assert_eq!(ids, vec!["greet", "ban"]);
    }

    #[test]
    fn group_cycles_abort() {
        let mut config = BotshellConfig::default();
        config.command_groups.insert("a".into(), vec!["b".into()]);
        config.command_groups.insert("b".into(), vec!["a".into()]);

        let err = assemble_commands(&["a".to_string()], &config, &known(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::GroupCycle(_)));
    }

    #[test]
    fn unknown_references_abort() {
        let config = BotshellConfig::default();
        let err =
            assemble_commands(&["ghost".to_string()], &config, &known(&["greet"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCommand(ref name) if name == "ghost"));
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut config = BotshellConfig::default();
        config.command_groups.insert("admin".into(), vec!["ban".into(), "greet".into()]);

        let entries = vec!["greet".to_string(), "admin".to_string(), "ban".to_string()];
        let ids = assemble_commands(&entries, &config, &known(&["greet", "ban"])).unwrap();
        assert_eq!(ids, vec!["greet", "ban"]);
    }

    #[test]
    fn bot_list_falls_back_to_global() {
        let mut config = BotshellConfig::default();
        config.commands = vec!["ping".into()];
        config.bots.insert("quiet".into(), Default::default());
        config.bots.insert("loud".into(), crate::schema::BotConfig {
            commands: vec!["greet".into()],
            ..Default::default()
        });

        let ids = commands_for_bot(&config, "quiet", &known(&["ping", "greet"])).unwrap();
        assert_eq!(ids, vec!["ping"]);
        let ids = commands_for_bot(&config, "loud", &known(&["ping", "greet"])).unwrap();
        assert_eq!(ids, vec!["greet"]);
        let ids = commands_for_bot(&config, "unknown", &known(&["ping", "greet"])).unwrap();
        assert_eq!(ids, vec!["ping"]);
    }

    #[test]
    fn group_name_wins_over_handler_id() {
        let mut config = BotshellConfig::default();
        config.command_groups.insert("greet".into(), vec!["wave".into()]);

        let ids = assemble_commands(&["greet".to_string()], &config, &known(&["greet", "wave"]))
            .unwrap();
        assert_eq!(ids, vec!["wave"]);
    }
}
