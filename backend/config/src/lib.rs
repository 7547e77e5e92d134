//! `botshell-config` — deployment configuration for the bot console.
//!
//! Provides:
//! - Typed config schema (bots, console behavior, command lists, middleware)
//! - YAML loading with config-dir resolution
//! - Shape validation with field paths
//! - Roster assembly: declared-command merge and command list expansion

pub mod assemble;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use assemble::{
    assemble_commands, commands_for_bot, merge_declared, ConfigError, DeclaredCommand,
};
pub use io::{config_dir, config_file_path, load_config};
pub use schema::{
    BotConfig, BotMiddlewareEntry, BotshellConfig, CacheConfig, ConsoleConfig, ForBot,
    GlobalMiddlewareEntry, GlobalMiddlewareItem, GlobalMiddlewareRule,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::Result;
use std::path::Path;

/// Load a config file and log every validation finding.
///
/// Reference errors (unknown ids, cycles, key conflicts) surface later,
/// when rosters assemble and middleware compiles; this entry point only
/// reads, parses, and reports.
pub async fn load_and_prepare(path: &Path) -> Result<BotshellConfig> {
    let config = load_config(path).await?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}
