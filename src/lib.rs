//! chat-alias: parameterized, channel-scoped command aliases for chat bots.
//!
//! Administrators declare short aliases (`zab`) that expand into a full
//! invocation of an underlying command with fixed arguments and options
//! (`baz --flag value`). Aliases can be tagged with an alias group; groups
//! are organised in exclusivity sets and each channel selects at most one
//! tag per set with the `alias.switch` command.
//!
//! # Architecture
//!
//! - **[`alias`]**: alias records, the alias store, group visibility and the resolver.
//! - **[`service`]**: command sync into the store and the pre-dispatch attach hook.
//! - **[`commands`]**: the `alias.switch` administrative command.
//! - **[`host`]**: a minimal command host (registry, sessions, channel store, dispatch).
//! - **[`parse`]**: message tokenizer and the command argument grammar.
//! - **[`config`]**: configuration loading with embedded defaults and user overlay.
//! - **[`logging`]**: file logging to `~/.local/share/chat-alias/alias.log`.

/// Alias records, store, group gate and resolver.
pub mod alias;
/// Administrative commands.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error types.
pub mod error;
/// In-process command host used by the binary and tests.
pub mod host;
/// File-based logging.
pub mod logging;
/// Tokenizer, argument parser and invocation types.
pub mod parse;
/// Alias service: command sync and attach hook.
pub mod service;

pub use config::Config;
pub use error::{AliasError, Result};

use host::{App, Command, Session};
use parse::{Argv, CommandParser};

/// Run the attach hook for one message against every command named in
/// `config`, each registered with a lenient parser.
///
/// `alias_groups` is the channel's current selection. This is the main entry
/// point for the binary and simple usage; hosts embed [`service::AliasService`]
/// directly.
pub fn preview(config: &Config, session: &Session, alias_groups: &[String]) -> Result<Argv> {
    let mut app = App::new(config.clone());
    for name in config.commands.keys() {
        app.command(Command::new(name).parser(CommandParser::lenient()));
    }
    app.settle()?;

    if let Some(key) = session.channel_key() {
        use host::ChannelStore;
        let channels = app.channels_mut();
        channels.init_channel(key.clone());
        channels.set_alias_groups(&key, alias_groups.to_vec())?;
    }

    let (argv, _) = app.interpret(session)?;
    Ok(argv)
}
