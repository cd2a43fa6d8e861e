//! The alias service: command sync into the store, and the attach hook.
//!
//! Command lifecycle events only queue the command name. The store is
//! rebuilt for every queued command in one [`AliasService::flush`], so a burst
//! of registrations is applied once, before the next message is resolved.

use log::{debug, error, info};

use crate::alias::{AliasRecord, AliasStore, Filter, Resolution, ResolveContext, Resolver};
use crate::config::{CommandAliasConfig, Config, GroupsConfig, PrefixMode};
use crate::error::{AliasError, ParseError, Result};
use crate::parse::{Argv, ParsedArgs};

/// A command that can own aliases.
pub trait AliasOwner {
    /// Canonical command name.
    fn name(&self) -> &str;
    /// Current alias configuration.
    fn alias_config(&self) -> &CommandAliasConfig;
    /// Parse an alias `source` string with this command's grammar.
    fn parse_source(&self, source: &str) -> std::result::Result<ParsedArgs, ParseError>;
}

/// Lookup of live commands by canonical name.
pub trait CommandLookup {
    type Command: AliasOwner;

    fn command(&self, name: &str) -> Option<&Self::Command>;
}

/// What the attach hook needs to know about the inbound message.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachContext<'a> {
    /// The prefix the message was addressed with; `None` if it had none.
    pub prefix: Option<&'a str>,
    /// Whether the bot was mentioned.
    pub appel: bool,
    pub is_direct: bool,
    pub resolve: ResolveContext<'a>,
}

#[derive(Debug)]
pub struct AliasService {
    groups: GroupsConfig,
    prefix_mode: PrefixMode,
    store: AliasStore,
    pending: Vec<String>,
}

impl AliasService {
    pub fn new(config: &Config) -> Self {
        Self {
            groups: config.groups.clone(),
            prefix_mode: config.settings.prefix_mode,
            store: AliasStore::new(),
            pending: Vec::new(),
        }
    }

    pub fn groups(&self) -> &GroupsConfig {
        &self.groups
    }

    /// Replace the group configuration. Stored aliases are unaffected.
    pub fn set_groups(&mut self, groups: GroupsConfig) {
        self.groups = groups;
    }

    pub fn set_prefix_mode(&mut self, mode: PrefixMode) {
        self.prefix_mode = mode;
    }

    pub fn store(&self) -> &AliasStore {
        &self.store
    }

    /// Commands queued for the next flush, in queue order.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Queue `command` for a rebuild of its aliases.
    pub fn sync(&mut self, command: &str) {
        if !self.pending.iter().any(|p| p == command) {
            self.pending.push(command.to_string());
        }
    }

    /// Queue a rebuild only if the alias-relevant configuration changed.
    /// Returns whether anything was queued.
    pub fn on_config_changed(
        &mut self,
        command: &str,
        old: &CommandAliasConfig,
        new: &CommandAliasConfig,
    ) -> bool {
        if old == new {
            debug!("alias config of {command:?} unchanged, skipping sync");
            return false;
        }
        self.sync(command);
        true
    }

    /// Drop every alias owned by a command that is going away.
    pub fn dispose(&mut self, command: &str) {
        self.pending.retain(|p| p != command);
        let removed = self.store.remove_owner(command);
        debug!("disposed {removed} alias(es) of {command:?}");
    }

    /// Rebuild the aliases of every queued command.
    ///
    /// Queued commands that no longer exist are skipped. A command whose
    /// alias `source` fails to parse is left with no aliases; the remaining
    /// commands are still applied and the first error is returned.
    pub fn flush<L: CommandLookup>(&mut self, lookup: &L) -> Result<usize> {
        let pending = std::mem::take(&mut self.pending);
        let mut applied = 0;
        let mut first_err = None;

        for name in pending {
            let Some(command) = lookup.command(&name) else {
                debug!("queued command {name:?} is gone, skipping");
                continue;
            };
            match build_records(command) {
                Ok(records) => {
                    debug!("synced {} alias(es) for {name:?}", records.len());
                    self.store.replace_owner(&name, records);
                    applied += 1;
                }
                Err(e) => {
                    error!("{e}");
                    self.store.remove_owner(&name);
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(applied),
        }
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.store, &self.groups)
    }

    pub fn resolve(&self, key: &str, ctx: &ResolveContext<'_>) -> Resolution<'_> {
        self.resolver().resolve(key, ctx)
    }

    pub fn get(&self, name: &str, ctx: &ResolveContext<'_>) -> Option<&AliasRecord> {
        self.resolver().get(name, ctx)
    }

    /// Rewrite `argv` through the longest matching alias prefix of its tokens.
    ///
    /// Does nothing if the host already picked a command or name, or if the
    /// message is an unaddressed root message under strict prefix policy.
    /// Returns whether an alias applied.
    pub fn attach(&self, argv: &mut Argv, ctx: &AttachContext<'_>) -> bool {
        if argv.command.is_some() || argv.name.is_some() {
            return false;
        }
        let strict = self.prefix_mode == PrefixMode::Strict || (!ctx.is_direct && !ctx.appel);
        if argv.root && ctx.prefix.is_none() && strict {
            return false;
        }

        let resolver = self.resolver();
        let mut segments: Vec<&str> = Vec::new();
        let mut resolved = None;
        let mut consumed = 0;

        for token in &argv.tokens {
            segments.push(&token.content);
            let Some(alias) = resolver.resolve(&segments.join("."), &ctx.resolve).alias else {
                break;
            };
            resolved = Some(alias);
            consumed += 1;
        }

        let Some(alias) = resolved else {
            return false;
        };

        argv.tokens.drain(..consumed);
        argv.command = Some(alias.command.clone());
        argv.args = alias.args.clone();
        argv.options = alias.options.clone();
        argv.alias = Some(alias.name.clone());
        info!(
            "alias {:?} -> {} (consumed {consumed} token(s))",
            alias.name, alias.command
        );
        true
    }
}

fn build_records<C: AliasOwner>(command: &C) -> Result<Vec<AliasRecord>> {
    let config = command.alias_config();
    config
        .aliases
        .iter()
        .map(|alias| {
            let parsed = match &alias.source {
                Some(raw) => command.parse_source(raw).map_err(|source| AliasError::Parse {
                    command: command.name().to_string(),
                    alias: alias.name.clone(),
                    source,
                })?,
                None => ParsedArgs::default(),
            };
            Ok(AliasRecord {
                name: alias.name.to_lowercase(),
                command: command.name().to_string(),
                source: alias.source.clone(),
                args: parsed.args,
                options: parsed.options,
                group: alias
                    .alias_group
                    .clone()
                    .or_else(|| config.default_alias_group.clone()),
                filter: alias.filter.clone().unwrap_or(Filter::Always),
            })
        })
        .collect()
}
