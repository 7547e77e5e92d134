//! Argument and option specifications.

use serde::{Deserialize, Serialize};

/// One positional argument of a command.
///
/// `value` stays empty on the registry copy; the resolver writes it only
/// into the bound copies carried by a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentSpec {
    pub name: String,
    /// Note the pattern polarity: `{name?}` declares a REQUIRED argument.
    #[serde(default)]
    pub required: bool,
    /// Validation regex without anchors; anchoring is applied at use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), required: false, pattern: None, value: None, description: None }
    }
}

/// One option (flag) of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    /// Long flag including dashes, e.g. `--queue`.
    pub long: String,
    /// Short flag including the dash, e.g. `-q`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub must_have: bool,
    /// Extraction/validation regex without anchors or delimiters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// True for registry-wide options such as `--help`.
    #[serde(default)]
    pub is_global: bool,
}

impl OptionSpec {
    pub fn new(long: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: None,
            required: false,
            must_have: false,
            pattern: None,
            value: None,
            description: None,
            is_global: false,
        }
    }

    /// Long name without leading dashes, used as the consumable key.
    pub fn key(&self) -> &str {
        self.long.trim_start_matches('-')
    }
}
