//! Pending reply state.
//!
//! At most one pending reply exists per scope. Writing a new one overwrites
//! the old, and the consumer removes it before acting so a reply is only
//! ever used once.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// What the next collected value should fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NextInput {
    /// A positional argument, by name.
    Arg { name: String },
    /// An option, by long flag (e.g. `--age`).
    Opt { name: String },
}

/// A parked continuation waiting for the user's next plain-text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PendingReply {
    /// Owned by the command inspector: the reply completes a missing
    /// argument or option and the command is rebuilt and re-dispatched.
    #[serde(rename_all = "camelCase")]
    Inspector {
        scope: String,
        /// Command path to re-dispatch (e.g. "make seed").
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_input: Option<String>,
        /// Arguments collected so far.
        #[serde(default)]
        args: Vec<String>,
        /// Raw option tokens collected so far (e.g. `["--force", "--age=23"]`).
        #[serde(default)]
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<NextInput>,
    },
    /// Owned by a command: the reply is routed to its `on_reply` hook along
    /// with the stored payload.
    #[serde(rename_all = "camelCase")]
    Custom {
        scope: String,
        /// Stable handler id the reply is routed to.
        handler: String,
        #[serde(default)]
        payload: BTreeMap<String, Value>,
    },
}

impl PendingReply {
    pub fn scope(&self) -> &str {
        match self {
            PendingReply::Inspector { scope, .. } => scope,
            PendingReply::Custom { scope, .. } => scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspector_round_trip() {
        let pending = PendingReply::Inspector {
            scope: "chat:1:user:2".into(),
            base_input: Some("make seed".into()),
            args: vec!["jhon".into()],
            options: vec!["--force".into()],
            next: Some(NextInput::Arg { name: "age".into() }),
        };
        let json = serde_json::to_string(&pending).unwrap();
        assert!(json.contains("\"mode\":\"inspector\""));
        assert!(json.contains("\"baseInput\":\"make seed\""));
        assert!(json.contains("\"type\":\"arg\""));
        let back: PendingReply = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pending);
    }

    #[test]
    fn test_custom_round_trip() {
        let pending = PendingReply::Custom {
            scope: "chat:1:user:2".into(),
            handler: "survey".into(),
            payload: BTreeMap::from([("step".to_string(), serde_json::json!(2))]),
        };
        let json = serde_json::to_string(&pending).unwrap();
        assert!(json.contains("\"mode\":\"custom\""));
        let back: PendingReply = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pending);
    }

    #[test]
    fn unknown_mode_fails_to_parse() {
        let err = serde_json::from_str::<PendingReply>(r#"{"mode":"mystery","scope":"s"}"#);
        assert!(err.is_err());
    }
}
