//! Authoring-config normalizer.
//!
//! Reads the loose middleware sections of the config file into
//! [`MiddlewareRule`] values. Bot sections only accept plain ids; the
//! global section also accepts `{id, forBot}` rules. A `command` key maps
//! command names to attachment lists. Empty ids are dropped; the same id
//! twice in one list is an authoring mistake and aborts.

use crate::compile::{CompileError, COMMAND_EVENT};
use crate::rule::{MiddlewareRule, RuleSource};
use botshell_config::{
    BotMiddlewareEntry, BotshellConfig, GlobalMiddlewareEntry, GlobalMiddlewareItem,
};
use tracing::debug;

/// Normalize every middleware section of the config into rules.
///
/// Rule order follows author order within each section; whether an id
/// actually resolves is checked at compile time.
pub fn normalize_rules(config: &BotshellConfig) -> Result<Vec<MiddlewareRule>, CompileError> {
    let mut rules = Vec::new();

    for (bot, bot_config) in &config.bots {
        for (event, entry) in &bot_config.middleware {
            match entry {
                BotMiddlewareEntry::Ids(ids) => {
                    let section = format!("bots.{bot}.middleware.{event}");
                    push_ids(&mut rules, ids, event, bot, None, &section)?;
                }
                BotMiddlewareEntry::Commands(map) => {
                    if event.as_str() != COMMAND_EVENT {
                        return Err(CompileError::MisplacedCommandMap(format!(
                            "bots.{bot}.middleware.{event}"
                        )));
                    }
                    for (command, ids) in map {
                        let section = format!("bots.{bot}.middleware.{event}.{command}");
                        push_ids(&mut rules, ids, event, bot, Some(command), &section)?;
                    }
                }
            }
        }
    }

    for (event, entry) in &config.middleware {
        match entry {
            GlobalMiddlewareEntry::Items(items) => {
                let section = format!("middleware.{event}");
                push_items(&mut rules, items, event, None, &section)?;
            }
            GlobalMiddlewareEntry::Commands(map) => {
                if event.as_str() != COMMAND_EVENT {
                    return Err(CompileError::MisplacedCommandMap(format!("middleware.{event}")));
                }
                for (command, items) in map {
                    let section = format!("middleware.{event}.{command}");
                    push_items(&mut rules, items, event, Some(command), &section)?;
                }
            }
        }
    }

    Ok(rules)
}

fn push_ids(
    rules: &mut Vec<MiddlewareRule>,
    ids: &[String],
    event: &str,
    bot: &str,
    command: Option<&str>,
    section: &str,
) -> Result<(), CompileError> {
    let mut seen: Vec<&str> = Vec::new();
    for id in ids {
        let id = id.trim();
        if id.is_empty() {
            debug!(section, "empty middleware id skipped");
            continue;
        }
        if seen.contains(&id) {
            return Err(CompileError::DuplicateMiddleware {
                id: id.to_string(),
                section: section.to_string(),
            });
        }
        seen.push(id);
        rules.push(MiddlewareRule {
            id: id.to_string(),
            event: event.to_string(),
            for_bot: Some(vec![bot.to_string()]),
            commands: command.map(|c| vec![c.to_string()]),
            source: RuleSource::BotConfig,
        });
    }
    Ok(())
}

fn push_items(
    rules: &mut Vec<MiddlewareRule>,
    items: &[GlobalMiddlewareItem],
    event: &str,
    command: Option<&str>,
    section: &str,
) -> Result<(), CompileError> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        let (id, for_bot) = match item {
            GlobalMiddlewareItem::Id(id) => (id.as_str(), None),
            GlobalMiddlewareItem::Rule(rule) => {
                (rule.id.as_str(), rule.for_bot.as_ref().and_then(|f| f.to_list()))
            }
        };
        let id = id.trim();
        if id.is_empty() {
            debug!(section, "empty middleware id skipped");
            continue;
        }
        if seen.iter().any(|s| s == id) {
            return Err(CompileError::DuplicateMiddleware {
                id: id.to_string(),
                section: section.to_string(),
            });
        }
        seen.push(id.to_string());
        rules.push(MiddlewareRule {
            id: id.to_string(),
            event: event.to_string(),
            for_bot,
            commands: command.map(|c| vec![c.to_string()]),
            source: RuleSource::GlobalConfig,
        });
    }
    Ok(())
}
