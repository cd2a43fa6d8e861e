//! A minimal in-process command host.
//!
//! Stands in for the chat framework the alias service plugs into: it keeps the
//! command registry, strips prefixes, runs the alias attach hook before
//! command lookup, and dispatches.

pub mod channel;
pub mod registry;
pub mod session;

pub use channel::{ChannelKey, ChannelRecord, ChannelStore, MemoryChannelStore};
pub use registry::{Action, ActionFn, Command, CommandEvent, CommandRegistry};
pub use session::{Session, Stripped};

use log::{debug, warn};

use crate::alias::ResolveContext;
use crate::commands::{SWITCH_COMMAND, switch_group};
use crate::config::{CommandAliasConfig, Config, PrefixMode};
use crate::error::Result;
use crate::logging;
use crate::parse::{Argv, tokenize};
use crate::service::{AliasService, AttachContext};

pub struct App<S: ChannelStore = MemoryChannelStore> {
    config: Config,
    registry: CommandRegistry,
    service: AliasService,
    channels: S,
}

impl App<MemoryChannelStore> {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, MemoryChannelStore::new())
    }
}

impl<S: ChannelStore> App<S> {
    pub fn with_store(config: Config, channels: S) -> Self {
        let service = AliasService::new(&config);
        let switch_authority = config.settings.switch_authority;
        let mut app = Self {
            config,
            registry: CommandRegistry::new(),
            service,
            channels,
        };
        app.command(
            Command::new(SWITCH_COMMAND)
                .authority(switch_authority)
                .channel_only()
                .with_action(Action::SwitchGroup),
        );
        app
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &AliasService {
        &self.service
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn channels(&self) -> &S {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut S {
        &mut self.channels
    }

    /// Register a command, merging its configured aliases into the declared ones.
    pub fn command(&mut self, mut command: Command) {
        command.effective = merged(&command.declared, self.config.commands.get(&command.name));
        let event = self.registry.add(command);
        self.handle(event);
    }

    pub fn remove_command(&mut self, name: &str) -> bool {
        match self.registry.remove(name) {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    /// Edit a command's alias configuration at runtime.
    pub fn set_command_aliases(&mut self, name: &str, aliases: CommandAliasConfig) -> bool {
        match self.registry.set_aliases(name, aliases) {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    /// Replace the configuration. Group and prefix settings take effect
    /// immediately; commands whose merged alias configuration changed are
    /// re-synced.
    pub fn reload_config(&mut self, config: Config) {
        self.service.set_groups(config.groups.clone());
        self.service.set_prefix_mode(config.settings.prefix_mode);
        self.registry
            .set_authority(SWITCH_COMMAND, config.settings.switch_authority);

        let updates: Vec<(String, CommandAliasConfig)> = self
            .registry
            .iter()
            .map(|c| (c.name.clone(), merged(&c.declared, config.commands.get(&c.name))))
            .collect();
        self.config = config;
        for (name, aliases) in updates {
            if let Some(event) = self.registry.set_aliases(&name, aliases) {
                self.handle(event);
            }
        }
    }

    fn handle(&mut self, event: CommandEvent) {
        debug!("command event: {event:?}");
        match event {
            CommandEvent::Added(name) => self.service.sync(&name),
            CommandEvent::Updated { name, old, new } => {
                self.service.on_config_changed(&name, &old, &new);
            }
            CommandEvent::Removed(name) => self.service.dispose(&name),
        }
    }

    /// Apply queued alias syncs.
    pub fn settle(&mut self) -> Result<usize> {
        self.service.flush(&self.registry)
    }

    fn addressed(&self, session: &Session, stripped: &Stripped) -> bool {
        let strict = self.config.settings.prefix_mode == PrefixMode::Strict
            || (!session.is_direct() && !stripped.appel);
        stripped.prefix.is_some() || !strict
    }

    /// Tokenize a message and run the alias attach hook over it.
    pub fn interpret(&mut self, session: &Session) -> Result<(Argv, bool)> {
        if let Err(e) = self.settle() {
            warn!("pending alias sync failed: {e}");
        }

        let stripped = session.strip(&self.config.settings.prefixes);
        let addressed = self.addressed(session, &stripped);
        let selection = match session.channel_key() {
            Some(key) => self.channels.alias_groups(&key)?,
            None => Vec::new(),
        };
        let filter = session.filter_context();
        let ctx = AttachContext {
            prefix: stripped.prefix.as_deref(),
            appel: stripped.appel,
            is_direct: session.is_direct(),
            resolve: ResolveContext {
                selection: &selection,
                filter: Some(&filter),
            },
        };

        let mut argv = Argv::root(tokenize(&stripped.content));
        if self.service.attach(&mut argv, &ctx) {
            logging::log_rewrite(&session.content, &argv);
        }
        Ok((argv, addressed))
    }

    /// Process one message and return the reply, if any.
    pub fn receive(&mut self, session: &Session) -> Result<Option<String>> {
        let (mut argv, addressed) = self.interpret(session)?;

        let name = match argv.command.clone() {
            Some(name) => name,
            None => {
                if !addressed {
                    return Ok(None);
                }
                let Some(first) = argv.tokens.first() else {
                    return Ok(None);
                };
                let name = first.content.to_lowercase();
                if self.registry.get(&name).is_none() {
                    return Ok(None);
                }
                argv.tokens.remove(0);
                argv.command = Some(name.clone());
                name
            }
        };

        let Some(command) = self.registry.get(&name) else {
            return Ok(None);
        };
        if session.authority < command.authority {
            return Ok(Some("insufficient authority".into()));
        }
        if command.channel_only && session.is_direct() {
            return Ok(Some("this command must be used in a channel".into()));
        }

        let parsed = match command.parser.parse_tokens(&argv.tokens) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(Some(format!("invalid arguments: {e}"))),
        };
        argv.tokens.clear();
        argv.args.extend(parsed.args);
        // fixed alias options win over typed ones
        for (key, value) in parsed.options {
            argv.options.entry(key).or_insert(value);
        }

        match command.action.clone() {
            Action::Reply(f) => Ok(Some(f(&argv))),
            Action::Silent => Ok(None),
            Action::SwitchGroup => {
                let Some(key) = session.channel_key() else {
                    return Ok(None);
                };
                let group = argv.args.first().map(String::as_str);
                let outcome = switch_group(self.service.groups(), &mut self.channels, &key, group)?;
                Ok(Some(outcome.to_string()))
            }
        }
    }
}

/// Declared aliases plus configured ones; a configured default group wins.
fn merged(declared: &CommandAliasConfig, configured: Option<&CommandAliasConfig>) -> CommandAliasConfig {
    let mut out = declared.clone();
    let Some(configured) = configured else {
        return out;
    };
    for alias in &configured.aliases {
        if !out.aliases.contains(alias) {
            out.aliases.push(alias.clone());
        }
    }
    if configured.default_alias_group.is_some() {
        out.default_alias_group = configured.default_alias_group.clone();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AliasConfig;

    #[test]
    fn merged_appends_configured_aliases() {
        let declared = CommandAliasConfig {
            aliases: vec![AliasConfig::named("a")],
            default_alias_group: Some("g1".into()),
        };
        let configured = CommandAliasConfig {
            aliases: vec![AliasConfig::named("a"), AliasConfig::named("b")],
            default_alias_group: None,
        };
        let out = merged(&declared, Some(&configured));
        assert_eq!(out.aliases, vec![AliasConfig::named("a"), AliasConfig::named("b")]);
        assert_eq!(out.default_alias_group.as_deref(), Some("g1"));
    }

    #[test]
    fn config_aliases_apply_at_registration() {
        let mut config = Config::default_config();
        config.commands.insert(
            "baz".into(),
            CommandAliasConfig {
                aliases: vec![AliasConfig::named("zab")],
                default_alias_group: None,
            },
        );
        let mut app = App::new(config);
        app.command(Command::new("baz").action(|_| "zab".into()));
        let reply = app.receive(&Session::direct("1", "zab")).unwrap();
        assert_eq!(reply.as_deref(), Some("zab"));
    }

    #[test]
    fn unknown_command_is_ignored() {
        let mut app = App::new(Config::default_config());
        assert_eq!(app.receive(&Session::direct("1", "hello there")).unwrap(), None);
    }

    #[test]
    fn switch_requires_channel_and_authority() {
        let mut app = App::new(Config::default_config());
        let reply = app
            .receive(&Session::direct("1", "alias.switch g1").with_authority(5))
            .unwrap();
        assert_eq!(reply.as_deref(), Some("this command must be used in a channel"));
        let reply = app.receive(&Session::channel("1", "2", "alias.switch g1")).unwrap();
        assert_eq!(reply.as_deref(), Some("insufficient authority"));
    }
}
