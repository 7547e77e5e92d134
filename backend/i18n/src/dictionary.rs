//! Nested string dictionary with dot-path lookup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A language dictionary.
///
/// Backed by a JSON-style object tree whose leaves are strings. Lookups that
/// miss resolve to the empty string so rendering never fails on a sparse
/// translation; callers that care test for emptiness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary(pub Map<String, Value>);

impl Dictionary {
    /// Accept only object-shaped values; scalars and lists are not a
    /// dictionary.
    pub fn from_value(value: Value) -> Option<Dictionary> {
        match value {
            Value::Object(map) => Some(Dictionary(map)),
            _ => None,
        }
    }

    /// Overlay `other` on top of this dictionary.
    ///
    /// The merge is shallow: a top-level key in `other` replaces the whole
    /// subtree under that key.
    pub fn merge_from(&mut self, other: Dictionary) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Resolve a dot-separated key path to its string value.
    ///
    /// The walk stops at the first string encountered; missing keys and
    /// non-string leaves yield `""`.
    pub fn text(&self, path: &str) -> String {
        let mut current = &self.0;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Object(map)) => current = map,
                _ => return String::new(),
            }
        }
        String::new()
    }

    /// `text` plus `{name}` placeholder substitution.
    pub fn text_with(&self, path: &str, vars: &[(&str, &str)]) -> String {
        interpolate(&self.text(path), vars)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Replace `{name}` placeholders from the given variables.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict() -> Dictionary {
        Dictionary::from_value(json!({
            "cmd": {
                "not_found": "Command not found: `{requested}`",
                "try_help": "Try: `{cmd} --help`",
            },
            "ok": "",
        }))
        .unwrap()
    }

    #[test]
    fn test_dot_path_lookup() {
        assert_eq!(dict().text("cmd.try_help"), "Try: `{cmd} --help`");
        assert_eq!(dict().text("ok"), "");
    }

    #[test]
    fn missing_keys_resolve_to_empty() {
        assert_eq!(dict().text("cmd.nope"), "");
        assert_eq!(dict().text("nope.deeper"), "");
    }

    #[test]
    fn walk_stops_at_first_string() {
        // Trailing segments after a string leaf are ignored.
        assert_eq!(dict().text("cmd.not_found.extra"), "Command not found: `{requested}`");
    }

    #[test]
    fn test_interpolation() {
        let out = dict().text_with("cmd.not_found", &[("requested", "mk")]);
        assert_eq!(out, "Command not found: `mk`");
    }

    #[test]
    fn merge_replaces_whole_top_level_subtrees() {
        let mut base = dict();
        let layer = Dictionary::from_value(json!({
            "cmd": { "not_found": "translated" },
        }))
        .unwrap();
        base.merge_from(layer);
        assert_eq!(base.text("cmd.not_found"), "translated");
        // Shallow merge drops sibling keys of the replaced subtree.
        assert_eq!(base.text("cmd.try_help"), "");
        assert_eq!(base.text("ok"), "");
    }

    #[test]
    fn rejects_non_object_values() {
        assert!(Dictionary::from_value(json!(["a", "b"])).is_none());
        assert!(Dictionary::from_value(json!("text")).is_none());
    }
}
