//! Command pattern parsing and option resolution.
//!
//! Pattern tokens are wrapped in `{}` and shared by arguments and options:
//!
//! - `{name}`          optional
//! - `{name?}`         required
//! - `{name: regex}`   optional with regex
//! - `{name?: regex}`  required with regex
//!
//! Regexes are written without anchors or delimiters; anchoring is applied
//! where a full-string match is wanted.

use crate::spec::{ArgumentSpec, OptionSpec};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

struct ParsedToken {
    name: String,
    required: bool,
    pattern: Option<String>,
}

fn parse_tokens(input: &str) -> Vec<ParsedToken> {
    let mut out = Vec::new();
    for cap in TOKEN_RE.captures_iter(input) {
        let token = cap[1].trim().to_string();

        let (mut name, pattern) = match token.split_once(':') {
            Some((name_part, pattern_part)) => {
                let pattern_part = pattern_part.trim();
                (
                    name_part.trim().to_string(),
                    if pattern_part.is_empty() { None } else { Some(pattern_part.to_string()) },
                )
            }
            None => (token, None),
        };

        let mut required = false;
        if let Some(stripped) = name.strip_suffix('?') {
            required = true;
            name = stripped.to_string();
        }
        if let Some(stripped) = name.strip_suffix('!') {
            required = true;
            name = stripped.to_string();
        }

        out.push(ParsedToken { name, required, pattern });
    }
    out
}

/// Parse an argument pattern such as `"{name} {age?: \d+}"`.
pub fn parse_arguments(pattern: &str) -> Vec<ArgumentSpec> {
    parse_tokens(pattern)
        .into_iter()
        .map(|t| ArgumentSpec {
            name: t.name,
            required: t.required,
            pattern: t.pattern,
            value: None,
            description: None,
        })
        .collect()
}

/// Parse an option pattern such as `"{queue} {force?}"`.
///
/// Long flags are `--{name}`; short flags are derived so every option in
/// the pattern gets a distinct one.
pub fn parse_options(pattern: &str) -> Vec<OptionSpec> {
    let tokens = parse_tokens(pattern);
    let names: Vec<String> = tokens.iter().map(|t| t.name.clone()).collect();
    let shorts = generate_short_flags(&names);

    tokens
        .into_iter()
        .map(|t| {
            let short = shorts.get(&t.name).cloned().unwrap_or_else(|| "x".to_string());
            OptionSpec {
                long: format!("--{}", t.name),
                short: Some(format!("-{short}")),
                required: t.required,
                must_have: false,
                pattern: t.pattern,
                value: None,
                description: None,
                is_global: false,
            }
        })
        .collect()
}

/// Derive distinct short flags for a set of option names.
///
/// Rules, tried in order per name: first letter; first unused distinct
/// character of the name; doubled then tripled first letter; first letter
/// plus a counter starting at 4.
fn generate_short_flags(names: &[String]) -> HashMap<String, String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut result = HashMap::new();

    for orig in names {
        let n = {
            let n = normalize(orig);
            if n.is_empty() { "x".to_string() } else { n }
        };
        let first = n.chars().next().unwrap_or('x');
        let first_s = first.to_string();

        let mut picked: Option<String> = None;

        if !used.contains(&first_s) {
            picked = Some(first_s.clone());
        }

        if picked.is_none() {
            let mut seen = HashSet::new();
            for ch in n.chars() {
                if seen.insert(ch) {
                    let candidate = ch.to_string();
                    if !used.contains(&candidate) {
                        picked = Some(candidate);
                        break;
                    }
                }
            }
        }

        if picked.is_none() {
            let doubled = format!("{first}{first}");
            if !used.contains(&doubled) {
                picked = Some(doubled);
            } else {
                let tripled = format!("{first}{first}{first}");
                if !used.contains(&tripled) {
                    picked = Some(tripled);
                }
            }
        }

        let picked = picked.unwrap_or_else(|| {
            let mut k = 4;
            loop {
                let candidate = format!("{first}{k}");
                if !used.contains(&candidate) {
                    break candidate;
                }
                k += 1;
            }
        });
        used.insert(picked.clone());
        result.insert(orig.clone(), picked);
    }

    result
}

fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Anchor a raw pattern for full-string validation, adding `^`/`$` only
/// when not already present. Empty input stays empty.
pub fn wrap_anchored(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let mut body = raw.to_string();
    if !body.starts_with('^') {
        body = format!("^{body}");
    }
    if !body.ends_with('$') {
        body = format!("{body}$");
    }
    body
}

/// True when the whole value matches the anchored pattern. An unparsable
/// pattern counts as a mismatch.
pub fn matches_anchored(raw: &str, value: &str) -> bool {
    let wrapped = wrap_anchored(raw);
    if wrapped.is_empty() {
        return false;
    }
    match Regex::new(&wrapped) {
        Ok(re) => re.is_match(value),
        Err(_) => false,
    }
}

/// Extract the first match of the unanchored filter pattern from a value.
pub fn extract_first(raw: &str, value: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let re = Regex::new(raw).ok()?;
    re.find(value).map(|m| m.as_str().to_string())
}

/// A consumable option value: a bare flag or extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
}

impl OptionValue {
    /// The textual value, if this option carried one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(t) => Some(t),
            OptionValue::Flag(_) => None,
        }
    }
}

/// Resolve raw option tokens into a consumable key-value map.
///
/// - `--name=dian` yields `name => "dian"`
/// - `--force` yields `force => true`
/// - a spec pattern acts as a filter: `--age=u23` with `\d+` yields
///   `age => "23"`; a non-matching value passes through unchanged because
///   validation already happened during resolution
/// - unknown flags are ignored
pub fn resolve_options(tokens: &[String], specs: &[OptionSpec]) -> BTreeMap<String, OptionValue> {
    let mut by_long: HashMap<String, &OptionSpec> = HashMap::new();
    let mut by_short: HashMap<String, &OptionSpec> = HashMap::new();
    for spec in specs {
        by_long.insert(spec.long.to_lowercase(), spec);
        if let Some(short) = &spec.short {
            by_short.insert(short.to_lowercase(), spec);
        }
    }

    let mut resolved = BTreeMap::new();

    for raw in tokens {
        let raw = raw.trim();
        if raw.is_empty() || !raw.starts_with('-') {
            continue;
        }

        let (name_part, value_part) = match raw.split_once('=') {
            Some((n, v)) => (n.trim(), Some(v.trim())),
            None => (raw, None),
        };

        let flag = name_part.to_lowercase();
        let Some(spec) = by_long.get(&flag).or_else(|| by_short.get(&flag)) else {
            continue;
        };

        let key = spec.key().to_string();

        let Some(value) = value_part.filter(|v| !v.is_empty()) else {
            resolved.insert(key, OptionValue::Flag(true));
            continue;
        };

        let value = match &spec.pattern {
            Some(pattern) if !pattern.trim().is_empty() => {
                extract_first(pattern, value).unwrap_or_else(|| value.to_string())
            }
            _ => value.to_string(),
        };
        resolved.insert(key, OptionValue::Text(value));
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let specs = parse_arguments(r"{name} {age?: \d+}");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "name");
        assert!(!specs[0].required);
        assert_eq!(specs[0].pattern, None);
        assert_eq!(specs[1].name, "age");
        assert!(specs[1].required);
        assert_eq!(specs[1].pattern.as_deref(), Some(r"\d+"));
    }

    #[test]
    fn bang_suffix_also_marks_required() {
        let specs = parse_arguments("{name!}");
        assert!(specs[0].required);
        assert_eq!(specs[0].name, "name");
    }

    #[test]
    fn pattern_split_happens_at_first_colon() {
        let specs = parse_arguments("{time: \\d+:\\d+}");
        assert_eq!(specs[0].name, "time");
        assert_eq!(specs[0].pattern.as_deref(), Some("\\d+:\\d+"));
    }

    #[test]
    fn test_parse_options_flags() {
        let specs = parse_options("{queue} {force?}");
        assert_eq!(specs[0].long, "--queue");
        assert_eq!(specs[0].short.as_deref(), Some("-q"));
        assert!(!specs[0].required);
        assert_eq!(specs[1].long, "--force");
        assert_eq!(specs[1].short.as_deref(), Some("-f"));
        assert!(specs[1].required);
    }

    #[test]
    fn short_flag_collisions_walk_the_rules() {
        let specs = parse_options("{verbose} {version} {value} {vv} {v4} {vermont}");
        let shorts: Vec<&str> = specs.iter().map(|s| s.short.as_deref().unwrap()).collect();
        // verbose: v; version: e (first unused distinct char); value: a;
        // vv: vv (doubled); v4: 4 (distinct char); vermont: r.
        assert_eq!(shorts, vec!["-v", "-e", "-a", "-vv", "-4", "-r"]);
        let unique: std::collections::HashSet<_> = shorts.iter().collect();
        assert_eq!(unique.len(), shorts.len());
    }

    #[test]
    fn test_wrap_anchored() {
        assert_eq!(wrap_anchored(r"\d+"), r"^\d+$");
        assert_eq!(wrap_anchored(r"^\d+$"), r"^\d+$");
        assert_eq!(wrap_anchored("  "), "");
    }

    #[test]
    fn anchored_match_requires_full_string() {
        assert!(matches_anchored(r"\d+", "23"));
        assert!(!matches_anchored(r"\d+", "u23"));
        // Broken regex counts as mismatch, not a panic.
        assert!(!matches_anchored("(", "anything"));
    }

    #[test]
    fn test_resolve_options() {
        let specs = parse_options("{age: \\d+} {force} {model}");
        let tokens = vec!["--age=u23".to_string(), "--model".to_string(), "--mystery=1".to_string()];
        let resolved = resolve_options(&tokens, &specs);

        assert_eq!(resolved.get("age"), Some(&OptionValue::Text("23".into())));
        assert_eq!(resolved.get("force"), None);
        assert_eq!(resolved.get("model"), Some(&OptionValue::Flag(true)));
        assert!(!resolved.contains_key("mystery"));
    }

    #[test]
    fn short_flags_resolve_to_long_keys() {
        let specs = parse_options("{force}");
        let resolved = resolve_options(&["-f".to_string()], &specs);
        assert_eq!(resolved.get("force"), Some(&OptionValue::Flag(true)));
    }

    #[test]
    fn non_matching_filter_passes_value_through() {
        let specs = parse_options("{age: \\d+}");
        let resolved = resolve_options(&["--age=old".to_string()], &specs);
        assert_eq!(resolved.get("age"), Some(&OptionValue::Text("old".into())));
    }

    #[test]
    fn empty_inline_value_reads_as_switch() {
        let specs = parse_options("{force}");
        let resolved = resolve_options(&["--force=".to_string()], &specs);
        assert_eq!(resolved.get("force"), Some(&OptionValue::Flag(true)));
    }
}
