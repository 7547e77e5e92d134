//! Middleware plan compiler.
//!
//! Folds declared middleware and normalized config rules into per-bot
//! buckets: one ordered id list per event, plus per-command lists for the
//! `command` pseudo-event. Precedence is declared, then bot config, then
//! global config, with single-event attachments landing before group
//! expansions within each source. Buckets keep the first occurrence on
//! duplicates.

use crate::registry::MiddlewareRegistry;
use crate::rule::{MiddlewareRule, RuleSource};
use botshell_core::{BotError, UpdateEvent};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

/// Command bucket that runs for every resolved command.
pub const ALL_COMMANDS: &str = "__all__";

/// Event key that targets resolved commands instead of a raw update kind.
pub const COMMAND_EVENT: &str = "command";

/// Fatal compilation errors. Any of these aborts boot.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown middleware id `{0}`")]
    UnknownMiddleware(String),

    #[error("unrecognized event key `{event}` for middleware `{id}`")]
    UnknownEvent { event: String, id: String },

    #[error("middleware `{id}` listed twice under `{section}`")]
    DuplicateMiddleware { id: String, section: String },

    #[error("per-command middleware map is only valid under `command`, not `{0}`")]
    MisplacedCommandMap(String),
}

impl From<CompileError> for BotError {
    fn from(err: CompileError) -> Self {
        BotError::Compile(err.to_string())
    }
}

/// Compiled middleware plan for one bot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotMiddleware {
    /// Ordered middleware ids per event.
    pub events: BTreeMap<UpdateEvent, Vec<String>>,
    /// Ordered middleware ids per command bucket (`__all__` or a name).
    pub commands: BTreeMap<String, Vec<String>>,
}

impl BotMiddleware {
    fn with_empty_buckets() -> Self {
        let mut events = BTreeMap::new();
        for event in UpdateEvent::ALL {
            events.insert(event, Vec::new());
        }
        Self { events, commands: BTreeMap::new() }
    }

    /// Chain for a raw update event.
    pub fn for_event(&self, event: UpdateEvent) -> &[String] {
        self.events.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Chain for a resolved command: the catch-all bucket first, then the
    /// named bucket, deduped keeping first occurrence.
    pub fn for_command(&self, name: &str) -> Vec<String> {
        let mut ids = Vec::new();
        for bucket in [ALL_COMMANDS, name] {
            if let Some(entries) = self.commands.get(bucket) {
                for id in entries {
                    if !ids.contains(id) {
                        ids.push(id.clone());
                    }
                }
            }
        }
        ids
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Pass {
    Single,
    Group,
}

/// Compile plans for every named bot. Blank names are skipped.
pub fn compile(
    bots: &[String],
    declared: &[String],
    rules: &[MiddlewareRule],
    registry: &MiddlewareRegistry,
) -> Result<BTreeMap<String, BotMiddleware>, CompileError> {
    let mut plans = BTreeMap::new();
    for bot in bots {
        let bot = bot.trim();
        if bot.is_empty() {
            continue;
        }
        plans.insert(bot.to_string(), compile_for_bot(bot, declared, rules, registry)?);
    }
    Ok(plans)
}

/// Compile the plan for one bot.
pub fn compile_for_bot(
    bot: &str,
    declared: &[String],
    rules: &[MiddlewareRule],
    registry: &MiddlewareRegistry,
) -> Result<BotMiddleware, CompileError> {
    // Every referenced id has to exist before any bucket fills.
    for id in declared {
        if !registry.contains(id) {
            return Err(CompileError::UnknownMiddleware(id.clone()));
        }
    }
    for rule in rules {
        if !registry.contains(&rule.id) {
            return Err(CompileError::UnknownMiddleware(rule.id.clone()));
        }
    }

    let mut plan = BotMiddleware::with_empty_buckets();

    apply_declared(&mut plan, bot, declared, registry, Pass::Single)?;
    apply_declared(&mut plan, bot, declared, registry, Pass::Group)?;

    for source in [RuleSource::BotConfig, RuleSource::GlobalConfig] {
        apply_rules(&mut plan, bot, rules, source, Pass::Single)?;
        apply_rules(&mut plan, bot, rules, source, Pass::Group)?;
    }

    for bucket in plan.events.values_mut() {
        dedup_bucket(bucket);
    }
    for bucket in plan.commands.values_mut() {
        dedup_bucket(bucket);
    }

    debug!(bot, "compiled middleware plan");
    Ok(plan)
}

fn apply_declared(
    plan: &mut BotMiddleware,
    bot: &str,
    declared: &[String],
    registry: &MiddlewareRegistry,
    pass: Pass,
) -> Result<(), CompileError> {
    for id in declared {
        let Some(middleware) = registry.get(id) else {
            return Err(CompileError::UnknownMiddleware(id.clone()));
        };
        if let Some(bots) = middleware.for_bot() {
            if !bots.iter().any(|b| b == bot) {
                continue;
            }
        }
        for event in middleware.events() {
            match pass {
                Pass::Single => {
                    if event == COMMAND_EVENT {
                        append_command(plan, id, middleware.commands());
                    } else if let Some(parsed) = UpdateEvent::parse(&event) {
                        push_event(plan, parsed, id);
                    } else if UpdateEvent::group(&event).is_none() {
                        return Err(CompileError::UnknownEvent { event, id: id.clone() });
                    }
                }
                Pass::Group => {
                    if let Some(members) = UpdateEvent::group(&event) {
                        for member in members {
                            push_event(plan, *member, id);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn apply_rules(
    plan: &mut BotMiddleware,
    bot: &str,
    rules: &[MiddlewareRule],
    source: RuleSource,
    pass: Pass,
) -> Result<(), CompileError> {
    for rule in rules {
        if rule.source != source || !rule.applies_to(bot) {
            continue;
        }
        match pass {
            Pass::Single => {
                if rule.event == COMMAND_EVENT {
                    append_command(plan, &rule.id, rule.commands.clone());
                } else if let Some(parsed) = UpdateEvent::parse(&rule.event) {
                    push_event(plan, parsed, &rule.id);
                } else if UpdateEvent::group(&rule.event).is_none() {
                    return Err(CompileError::UnknownEvent {
                        event: rule.event.clone(),
                        id: rule.id.clone(),
                    });
                }
            }
            Pass::Group => {
                if let Some(members) = UpdateEvent::group(&rule.event) {
                    for member in members {
                        push_event(plan, *member, &rule.id);
                    }
                }
            }
        }
    }
    Ok(())
}

fn push_event(plan: &mut BotMiddleware, event: UpdateEvent, id: &str) {
    plan.events.entry(event).or_default().push(id.to_string());
}

/// `None` or an empty list targets every command; `*` is the catch-all.
fn append_command(plan: &mut BotMiddleware, id: &str, commands: Option<Vec<String>>) {
    let mut names = commands.unwrap_or_default();
    if names.is_empty() {
        names.push("*".to_string());
    }
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let key = if name == "*" { ALL_COMMANDS } else { name };
        plan.commands.entry(key.to_string()).or_default().push(id.to_string());
    }
}

fn dedup_bucket(bucket: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    bucket.retain(|id| !id.is_empty() && seen.insert(id.clone()));
}
