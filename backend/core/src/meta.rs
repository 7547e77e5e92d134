//! Authorization context.

use crate::context::UpdateContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Facts about the sender that authorization gates may consult.
///
/// The runtime builds this once per update and threads it through resolution
/// and help rendering unchanged. Handlers treat it as read-only input; what
/// the `attributes` bag contains is up to the host application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl UpdateMeta {
    pub fn from_context(ctx: &UpdateContext) -> Self {
        let chat_id = ctx.message.as_ref().map(|m| m.chat.id);
        let user_id = ctx.message.as_ref().and_then(|m| m.from.as_ref()).map(|u| u.id);
        Self { chat_id, user_id, attributes: BTreeMap::new() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// True when the attribute exists and is boolean `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.attributes.get(key), Some(Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_lookup() {
        let meta = UpdateMeta::default()
            .with_attribute("admin", true)
            .with_attribute("role", "ops");
        assert!(meta.flag("admin"));
        assert!(!meta.flag("role"));
        assert!(!meta.flag("missing"));
        assert_eq!(meta.get("role"), Some(&Value::String("ops".into())));
    }
}
