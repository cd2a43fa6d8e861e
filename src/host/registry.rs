use std::fmt;
use std::sync::Arc;

use crate::config::{AliasConfig, CommandAliasConfig};
use crate::error::ParseError;
use crate::parse::{Argv, CommandParser, ParsedArgs};
use crate::service::{AliasOwner, CommandLookup};

pub type ActionFn = Arc<dyn Fn(&Argv) -> String + Send + Sync>;

/// What a command does once dispatched.
#[derive(Clone)]
pub enum Action {
    /// Reply with the returned text.
    Reply(ActionFn),
    /// Run the alias group switch.
    SwitchGroup,
    /// Accept the invocation without replying.
    Silent,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Reply(_) => f.write_str("Reply(..)"),
            Action::SwitchGroup => f.write_str("SwitchGroup"),
            Action::Silent => f.write_str("Silent"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    /// Minimum session authority required to run the command.
    pub authority: u32,
    /// Reject direct-message invocations.
    pub channel_only: bool,
    pub parser: CommandParser,
    /// Aliases declared in code.
    pub declared: CommandAliasConfig,
    /// Declared aliases merged with configuration; what the alias service reads.
    pub(crate) effective: CommandAliasConfig,
    pub action: Action,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            authority: 1,
            channel_only: false,
            parser: CommandParser::new(),
            declared: CommandAliasConfig::default(),
            effective: CommandAliasConfig::default(),
            action: Action::Silent,
        }
    }

    pub fn authority(mut self, authority: u32) -> Self {
        self.authority = authority;
        self
    }

    pub fn channel_only(mut self) -> Self {
        self.channel_only = true;
        self
    }

    pub fn parser(mut self, parser: CommandParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn alias(mut self, alias: AliasConfig) -> Self {
        self.declared.aliases.push(alias);
        self.effective = self.declared.clone();
        self
    }

    pub fn default_alias_group(mut self, group: &str) -> Self {
        self.declared.default_alias_group = Some(group.to_string());
        self.effective = self.declared.clone();
        self
    }

    pub fn action(mut self, f: impl Fn(&Argv) -> String + Send + Sync + 'static) -> Self {
        self.action = Action::Reply(Arc::new(f));
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn aliases(&self) -> &CommandAliasConfig {
        &self.effective
    }
}

impl AliasOwner for Command {
    fn name(&self) -> &str {
        &self.name
    }

    fn alias_config(&self) -> &CommandAliasConfig {
        &self.effective
    }

    fn parse_source(&self, source: &str) -> Result<ParsedArgs, ParseError> {
        self.parser.parse(source)
    }
}

/// Lifecycle notifications emitted by the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEvent {
    Added(String),
    Updated {
        name: String,
        old: CommandAliasConfig,
        new: CommandAliasConfig,
    },
    Removed(String),
}

/// Live commands in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Re-registering a name replaces the command.
    pub fn add(&mut self, command: Command) -> CommandEvent {
        match self.commands.iter_mut().find(|c| c.name == command.name) {
            Some(existing) => {
                let old = std::mem::replace(existing, command);
                CommandEvent::Updated {
                    name: old.name,
                    old: old.effective,
                    new: existing.effective.clone(),
                }
            }
            None => {
                let name = command.name.clone();
                self.commands.push(command);
                CommandEvent::Added(name)
            }
        }
    }

    /// Replace a command's effective alias configuration.
    pub fn set_aliases(&mut self, name: &str, aliases: CommandAliasConfig) -> Option<CommandEvent> {
        let command = self.commands.iter_mut().find(|c| c.name == name)?;
        let old = std::mem::replace(&mut command.effective, aliases);
        Some(CommandEvent::Updated {
            name: name.to_string(),
            old,
            new: command.effective.clone(),
        })
    }

    /// Change a command's required authority. Returns false if no such command.
    pub fn set_authority(&mut self, name: &str, authority: u32) -> bool {
        match self.commands.iter_mut().find(|c| c.name == name) {
            Some(command) => {
                command.authority = authority;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<CommandEvent> {
        let idx = self.commands.iter().position(|c| c.name == name)?;
        let command = self.commands.remove(idx);
        Some(CommandEvent::Removed(command.name))
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }
}

impl CommandLookup for CommandRegistry {
    type Command = Command;

    fn command(&self, name: &str) -> Option<&Command> {
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_readd_emits_update() {
        let mut registry = CommandRegistry::new();
        assert_eq!(
            registry.add(Command::new("Baz")),
            CommandEvent::Added("baz".into())
        );
        let event = registry.add(Command::new("baz").alias(AliasConfig::named("zab")));
        let CommandEvent::Updated { old, new, .. } = event else {
            panic!("expected an update event");
        };
        assert!(old.aliases.is_empty());
        assert_eq!(new.aliases, vec![AliasConfig::named("zab")]);
        assert_eq!(registry.iter().count(), 1);
    }

    #[test]
    fn set_authority_updates_registered_command() {
        let mut registry = CommandRegistry::new();
        registry.add(Command::new("bar").authority(3));
        assert!(registry.set_authority("bar", 5));
        assert_eq!(registry.get("bar").unwrap().authority, 5);
        assert!(!registry.set_authority("missing", 5));
    }

    #[test]
    fn set_aliases_on_missing_command() {
        let mut registry = CommandRegistry::new();
        assert!(registry.set_aliases("nope", CommandAliasConfig::default()).is_none());
    }

    #[test]
    fn remove_command() {
        let mut registry = CommandRegistry::new();
        registry.add(Command::new("baz"));
        assert_eq!(registry.remove("baz"), Some(CommandEvent::Removed("baz".into())));
        assert!(registry.get("baz").is_none());
        assert!(registry.remove("baz").is_none());
    }
}
