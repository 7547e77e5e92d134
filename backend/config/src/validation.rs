//! Config validation: shape checks with field paths, errors and warnings.

use crate::schema::BotshellConfig;
use thiserror::Error;

/// A config validation finding with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation findings from one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
///
/// Reference errors (unknown ids, group cycles, shared-key conflicts) are
/// not checked here; those abort roster assembly and middleware
/// compilation with typed errors instead.
pub fn validate(config: &BotshellConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_bots(config, &mut report);
    validate_console(config, &mut report);
    validate_commands(config, &mut report);
    report
}

fn validate_bots(config: &BotshellConfig, report: &mut ValidationReport) {
    if config.default_bot.trim().is_empty() {
        report.error("defaultBot", "Default bot name cannot be empty");
    }
    for name in config.bots.keys() {
        if name.trim().is_empty() {
            report.error("bots", "Bot name cannot be empty");
        }
    }
    if !config.bots.is_empty() && !config.bots.contains_key(&config.default_bot) {
        report.warn(
            "defaultBot",
            format!("Default bot '{}' is not declared under bots", config.default_bot),
        );
    }
}

fn validate_console(config: &BotshellConfig, report: &mut ValidationReport) {
    let console = &config.console;
    if console.lang.trim().is_empty() {
        report.error("console.lang", "Language code cannot be empty");
    }
    if console.listen_reply_ttl == 0 {
        report.warn(
            "console.listenReplyTtl",
            "TTL of 0 is clamped to 120 seconds at runtime",
        );
    }
    for (i, path) in console.lang_paths.iter().enumerate() {
        if path.trim().is_empty() {
            report.error(format!("console.langPaths[{i}]"), "Path cannot be empty");
        }
    }
    for flag in &console.help_flags {
        if !flag.starts_with('-') {
            report.warn(
                "console.helpFlags",
                format!("Flag '{flag}' does not start with '-' and can never match"),
            );
        }
    }
}

fn validate_commands(config: &BotshellConfig, report: &mut ValidationReport) {
    for (i, entry) in config.commands.iter().enumerate() {
        if entry.trim().is_empty() {
            report.error(format!("commands[{i}]"), "Command entry cannot be empty");
        }
    }
    for (bot, bot_config) in &config.bots {
        for (i, entry) in bot_config.commands.iter().enumerate() {
            if entry.trim().is_empty() {
                report.error(
                    format!("bots.{bot}.commands[{i}]"),
                    "Command entry cannot be empty",
                );
            }
        }
    }
    for (group, members) in &config.command_groups {
        if group.trim().is_empty() {
            report.error("commandGroups", "Group name cannot be empty");
        }
        for (i, member) in members.iter().enumerate() {
            if member.trim().is_empty() {
                report.error(
                    format!("commandGroups.{group}[{i}]"),
                    "Group member cannot be empty",
                );
            }
        }
    }
    for (key, id) in &config.shared_commands {
        if key.trim().is_empty() {
            report.error("sharedCommands", "Shared key cannot be empty");
        }
        if id.trim().is_empty() {
            report.error(format!("sharedCommands.{key}"), "Handler id cannot be empty");
        }
    }
}
