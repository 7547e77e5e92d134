//! `botshell-middleware` — cross-cutting update processing.
//!
//! Middleware is authored in code (declaration methods on the trait) or
//! in the config file (per-bot and global sections). Authoring shapes are
//! normalized into rules and compiled into per-bot buckets the runtime
//! walks once per update.

pub mod compile;
pub mod normalize;
pub mod registry;
pub mod rule;

pub use compile::{
    compile, compile_for_bot, BotMiddleware, CompileError, ALL_COMMANDS, COMMAND_EVENT,
};
pub use normalize::normalize_rules;
pub use registry::{Middleware, MiddlewareRegistry};
pub use rule::{MiddlewareRule, RuleSource};
