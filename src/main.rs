//! chat-alias: resolve one chat message through configured command aliases.
//!
//! Reads a JSON message from stdin and writes the rewritten invocation to
//! stdout as JSON.
//!
//!   chat-alias [--config <path>] [--strict] [--verbose] < message.json
//!   chat-alias [--config <path>] --dump-config

use std::io::Read;

use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;

use chat_alias::config::{Config, PrefixMode};
use chat_alias::host::Session;
use chat_alias::logging;

#[derive(Deserialize)]
struct MessageInput {
    content: String,
    #[serde(default = "default_user")]
    user: String,
    #[serde(default)]
    channel: Option<String>,
    /// Treat the message as direct even if a channel is given.
    #[serde(default)]
    direct: bool,
    #[serde(default = "default_platform")]
    platform: String,
    #[serde(default)]
    mentioned: bool,
    #[serde(default)]
    alias_groups: Vec<String>,
    #[serde(default = "default_authority")]
    authority: u32,
}

impl MessageInput {
    /// Split into the session to resolve and the channel's active groups.
    fn into_session(self) -> (Session, Vec<String>) {
        let channel = if self.direct { None } else { self.channel };
        let session = Session {
            platform: self.platform,
            user_id: self.user,
            guild_id: channel.clone(),
            channel_id: channel,
            authority: self.authority,
            mentioned: self.mentioned,
            content: self.content,
        };
        (session, self.alias_groups)
    }
}

fn default_user() -> String {
    "user".into()
}

fn default_platform() -> String {
    "cli".into()
}

fn default_authority() -> u32 {
    1
}

/// Resolve one chat message through configured command aliases.
#[derive(Parser, Debug)]
#[command(name = "chat-alias", version, about, long_about = None)]
struct Cli {
    /// Configuration overlay file (merged over the embedded defaults)
    #[arg(long)]
    config: Option<String>,

    /// Print the merged configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Require a prefix or mention on every message
    #[arg(long)]
    strict: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // clap exits with status 2 on usage errors
    let args = Cli::parse();

    logging::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let mut config = match &args.config {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("chat-alias: {e}");
                std::process::exit(2);
            }
        },
        None => Config::load(),
    };
    if args.strict {
        config.settings.prefix_mode = PrefixMode::Strict;
    }

    if args.dump_config {
        match toml::to_string_pretty(&config) {
            Ok(s) => print!("{s}"),
            Err(e) => {
                eprintln!("chat-alias: cannot serialize config: {e}");
                std::process::exit(2);
            }
        }
        return;
    }

    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("failed to read stdin");
        std::process::exit(1);
    }

    let message: MessageInput = match serde_json::from_str(&input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("JSON parse error: {e}");
            std::process::exit(1);
        }
    };

    let (session, alias_groups) = message.into_session();
    let argv = match chat_alias::preview(&config, &session, &alias_groups) {
        Ok(argv) => argv,
        Err(e) => {
            eprintln!("chat-alias: {e}");
            std::process::exit(2);
        }
    };

    let output = serde_json::json!({
        "command": argv.command,
        "alias": argv.alias,
        "args": argv.args,
        "options": argv.options,
        "tokens": argv.tokens.iter().map(|t| t.content.as_str()).collect::<Vec<_>>(),
    });

    match serde_json::to_string(&output) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("chat-alias: {e}");
            std::process::exit(1);
        }
    }
}
