pub mod builtins;

use crate::shell::context::CommandContext;
use crate::shell::error::ShellError;
use anyhow::Result;
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// The contract every built-in implements. The core never looks past it.
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    /// `args` excludes the command name itself.
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()>;

    fn help(&self) -> &str;

    fn short_help(&self) -> &str;
}

/// Name to implementation map. Filled once at startup, then only read,
/// possibly from several pipeline workers at the same time.
#[derive(Default)]
pub struct Registry {
    commands: RwLock<BTreeMap<String, Arc<dyn Command>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, command: Arc<dyn Command>) -> Result<()> {
        self.register_as(command.name().to_string(), command)
    }

    /// Register under a name other than `Command::name`, e.g. `.` for `source`.
    pub fn register_as(&self, name: impl Into<String>, command: Arc<dyn Command>) -> Result<()> {
        let name = name.into();
        let mut map = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&name) {
            return Err(ShellError::DuplicateCommand(name).into());
        }
        debug!("registered command {}", name);
        map.insert(name, command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Sorted command names.
    pub fn list(&self) -> Vec<String> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Closest registered name within two edits, for "did you mean".
    pub fn closest(&self, name: &str) -> Option<String> {
        self.list()
            .into_iter()
            .map(|candidate| (edit_distance(name, &candidate), candidate))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| candidate)
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::commands::builtins::io::echo::EchoCommand;

    #[test]
    fn test_register_get_list() {
        let registry = Registry::new();
        registry.register(Arc::new(EchoCommand)).unwrap();
        registry.register_as("say", Arc::new(EchoCommand)).unwrap();

        assert!(registry.get("echo").is_some());
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.list(), vec!["echo".to_string(), "say".to_string()]);
    }

    #[test]
    fn test_closest_name() {
        let registry = Registry::new();
        registry.register(Arc::new(EchoCommand)).unwrap();
        assert_eq!(registry.closest("ecoh").as_deref(), Some("echo"));
        assert_eq!(registry.closest("printf"), None);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Registry::new();
        registry.register(Arc::new(EchoCommand)).unwrap();
        let err = registry.register(Arc::new(EchoCommand)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShellError>(),
            Some(ShellError::DuplicateCommand(name)) if name == "echo"
        ));
    }
}
