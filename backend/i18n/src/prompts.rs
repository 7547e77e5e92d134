//! Interactive prompt templates.
//!
//! When the renderer asks the user for a missing argument or option it
//! resolves the question text here. Template priority, highest first:
//! a per-key override declared on the command, the `prompt.{key}` entry in
//! the dictionary, then the generic `prompt.default` entry.

use crate::dictionary::{interpolate, Dictionary};
use std::collections::BTreeMap;

/// What kind of input is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Argument,
    Option,
}

impl PromptKind {
    fn label(&self) -> &'static str {
        match self {
            PromptKind::Argument => "argument",
            PromptKind::Option => "option",
        }
    }
}

/// Resolve the prompt text for one missing input.
///
/// `overrides` is the command's per-key template map and `variables` its
/// per-key extra placeholder values; `variables["default"]` applies to every
/// key and key-specific entries win over it. The built-in placeholders are
/// `{type}` and `{text}`. Returns an empty string when no template resolves,
/// in which case the caller falls back to a static message.
pub fn prompt_text(
    dict: &Dictionary,
    key: &str,
    kind: PromptKind,
    overrides: &BTreeMap<String, String>,
    variables: &BTreeMap<String, BTreeMap<String, String>>,
) -> String {
    let mut vars: BTreeMap<&str, &str> = BTreeMap::new();
    vars.insert("type", kind.label());
    vars.insert("text", key);
    if let Some(defaults) = variables.get("default") {
        for (name, value) in defaults {
            vars.insert(name.as_str(), value.as_str());
        }
    }
    if let Some(specific) = variables.get(key) {
        for (name, value) in specific {
            vars.insert(name.as_str(), value.as_str());
        }
    }

    let template = match overrides.get(key) {
        Some(t) => t.clone(),
        None => {
            let keyed = dict.text(&format!("prompt.{key}"));
            if keyed.is_empty() { dict.text("prompt.default") } else { keyed }
        }
    };

    let pairs: Vec<(&str, &str)> = vars.into_iter().collect();
    interpolate(&template, &pairs)
}
