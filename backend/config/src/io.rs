//! Config file location and loading.

use crate::schema::BotshellConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "botshell.yaml";

/// Resolve the botshell config directory.
/// Priority: `BOTSHELL_CONFIG_DIR` env > `~/.botshell/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BOTSHELL_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".botshell");
    }
    PathBuf::from(".botshell")
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<BotshellConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(BotshellConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: BotshellConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        let config = load_config(&path).await.unwrap();
        assert_eq!(config.default_bot, "main");
    }

    #[tokio::test]
    async fn loads_a_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        fs::write(&path, "defaultBot: support\ncommands: [ping]\n")
            .await
            .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.default_bot, "support");
        assert_eq!(config.commands, vec!["ping"]);
    }

    #[tokio::test]
    async fn malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        fs::write(&path, "defaultBot: [unclosed").await.unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config YAML"));
    }

    #[test]
    fn env_override_wins_over_home() {
        std::env::set_var("BOTSHELL_CONFIG_DIR", "/tmp/botshell-test-dir");
        assert_eq!(config_dir(), PathBuf::from("/tmp/botshell-test-dir"));
        std::env::remove_var("BOTSHELL_CONFIG_DIR");
        assert!(config_dir().ends_with(".botshell"));
    }
}
