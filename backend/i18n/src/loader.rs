//! Layered dictionary loading.
//!
//! A language is assembled from the built-in dictionary plus any configured
//! folders, in order, with later layers overriding earlier ones at the top
//! level. Loaded dictionaries are cached per language until explicitly
//! cleared.

use crate::defaults::{builtin, BUILTIN_LANGS};
use crate::dictionary::Dictionary;
use botshell_cache::KvCache;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Base cache key for language dictionaries.
pub const CACHE_KEY: &str = "botshell:i18n";

/// Resolves dictionaries from an ordered list of folders.
///
/// Each folder may hold `{lang}.yaml` or `{lang}.json` files; when both
/// exist the YAML file wins and the JSON file is ignored for that folder.
#[derive(Clone, Default)]
pub struct DictionarySource {
    paths: Vec<PathBuf>,
    cache: Option<Arc<dyn KvCache>>,
}

impl DictionarySource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<dyn KvCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Load the merged dictionary for a language.
    pub fn load(&self, lang: &str) -> Dictionary {
        let lang = lang.trim().to_lowercase();
        let cache_key = format!("{CACHE_KEY}:{lang}");

        if let Some(cache) = &self.cache {
            if let Some(bytes) = cache.get(&cache_key) {
                match serde_json::from_slice::<Dictionary>(&bytes) {
                    Ok(dict) => return dict,
                    Err(err) => debug!(lang, %err, "discarding unreadable cached dictionary"),
                }
            }
        }

        let mut dict = builtin(&lang).unwrap_or_default();
        for path in &self.paths {
            if let Some(layer) = load_lang_file(path, &lang) {
                dict.merge_from(layer);
            }
        }

        if let Some(cache) = &self.cache {
            match serde_json::to_vec(&dict) {
                Ok(bytes) => cache.put(&cache_key, bytes, None),
                Err(err) => warn!(lang, %err, "failed to serialize dictionary for caching"),
            }
        }

        dict
    }

    /// Languages available from built-ins and folder scans, first-seen order.
    pub fn available_langs(&self) -> Vec<String> {
        let mut langs: Vec<String> = BUILTIN_LANGS.iter().map(|l| l.to_string()).collect();
        for path in &self.paths {
            let Ok(entries) = fs::read_dir(path) else { continue };
            for entry in entries.flatten() {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                let stem = name
                    .strip_suffix(".yaml")
                    .or_else(|| name.strip_suffix(".json"));
                if let Some(stem) = stem {
                    let stem = stem.to_lowercase();
                    if !stem.is_empty() && !langs.contains(&stem) {
                        langs.push(stem);
                    }
                }
            }
        }
        langs
    }

    /// Drop every cached dictionary for the languages this source knows.
    pub fn clear_cached(&self) {
        let Some(cache) = &self.cache else { return };
        for lang in self.available_langs() {
            cache.forget(&format!("{CACHE_KEY}:{lang}"));
        }
    }
}

/// Read one dictionary file for a language from a folder.
///
/// Non-object payloads and unreadable files are skipped with a debug log so
/// a bad translation file never takes the bot down.
fn load_lang_file(dir: &Path, lang: &str) -> Option<Dictionary> {
    let yaml = dir.join(format!("{lang}.yaml"));
    if yaml.is_file() {
        let raw = match fs::read_to_string(&yaml) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %yaml.display(), %err, "skipping unreadable dictionary file");
                return None;
            }
        };
        return match serde_yaml::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Dictionary::from_value(value),
            Err(err) => {
                debug!(path = %yaml.display(), %err, "skipping malformed dictionary file");
                None
            }
        };
    }

    let json = dir.join(format!("{lang}.json"));
    if json.is_file() {
        let raw = match fs::read_to_string(&json) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %json.display(), %err, "skipping unreadable dictionary file");
                return None;
            }
        };
        return match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Dictionary::from_value(value),
            Err(err) => {
                debug!(path = %json.display(), %err, "skipping malformed dictionary file");
                None
            }
        };
    }

    None
}
