use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

/// Leading-word rewrites for the session. Seeded from `[aliases]`, then
/// changed by `alias` and `unalias` while the session runs.
#[derive(Debug, Default)]
pub struct Aliases {
    map: RwLock<BTreeMap<String, String>>,
}

impl Aliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(aliases: &HashMap<String, String>) -> Self {
        let map = aliases.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Self {
            map: RwLock::new(map),
        }
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        debug!("alias {}={}", name, value);
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    /// False when there was no such alias.
    pub fn remove(&self, name: &str) -> bool {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Sorted by name.
    pub fn list(&self) -> Vec<(String, String)> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Replaces the first word of `line` when it names an alias. Only one
    /// rewrite happens, so `ls = "ls -a"` does not loop.
    pub fn expand(&self, line: &str) -> Option<String> {
        let trimmed = line.trim_start();
        let end = trimmed
            .find(|c: char| c.is_whitespace() || matches!(c, '|' | ';' | '&' | '<' | '>'))
            .unwrap_or(trimmed.len());
        let (word, rest) = trimmed.split_at(end);
        let replacement = self.get(word)?;
        Some(format!("{}{}", replacement, rest))
    }
}

/// Alias names are single words free of quoting and operators.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '=' | '|' | ';' | '&' | '<' | '>' | '\'' | '"' | '$'))
}
