//! Name and alias lookup for commands.

use std::collections::HashMap;

use crate::command::Command;

/// Registry of available commands.
///
/// Built once at startup and owned by the shell; commands see it through
/// their execution context.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    /// alias -> canonical name
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// A registry holding every built-in command.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        crate::register_builtins(&mut reg);
        reg
    }

    /// Register a command and its aliases. Replaces any existing command
    /// with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let name = cmd.name().to_string();
        for alias in cmd.aliases() {
            self.aliases.insert((*alias).to_string(), name.clone());
        }
        self.commands.insert(name, cmd);
    }

    /// Look up a command by name or alias. Aliases win.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        let canonical = self.aliases.get(name).map_or(name, String::as_str);
        self.commands.get(canonical).map(Box::as_ref)
    }

    /// The command an alias points at.
    pub fn alias_target(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every name and alias, sorted and deduplicated.
    pub fn all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .keys()
            .chain(self.aliases.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Return a sorted list of (name, description) pairs.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }

    /// Registered commands, sorted by name.
    pub fn commands(&self) -> Vec<&dyn Command> {
        let mut cmds: Vec<&dyn Command> = self.commands.values().map(Box::as_ref).collect();
        cmds.sort_by(|a, b| a.name().cmp(b.name()));
        cmds
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
