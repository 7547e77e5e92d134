//! Error types for the botshell runtime.

use thiserror::Error;

/// Top-level error for building and running a bot pipeline.
///
/// Component crates define their own narrow error enums and convert into
/// this one at the runtime boundary.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("middleware compile error: {0}")]
    Compile(String),

    #[error("command registry error: {0}")]
    Registry(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BotError {
    pub fn config(msg: impl Into<String>) -> Self {
        BotError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BotError::config("missing bot token");
        assert_eq!(err.to_string(), "configuration error: missing bot token");
    }

    #[test]
    fn wraps_anyhow() {
        let err: BotError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, BotError::Other(_)));
    }
}
