//! Types produced by the message tokenizer and consumed by the alias layer.

use std::collections::BTreeMap;

use serde::Serialize;

/// Option values keyed by long option name.
pub type Options = BTreeMap<String, serde_json::Value>;

/// One word of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Word text with surrounding quotes removed.
    pub content: String,
    /// Whether the word was written inside quotes.
    pub quoted: bool,
    /// The character that ended the word (`" "`), or empty at end of input.
    pub terminator: String,
    /// Bodies of `$(...)` interpolations found inside the word.
    pub inters: Vec<String>,
}

impl Token {
    /// An unquoted word with no interpolations.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            quoted: false,
            terminator: String::new(),
            inters: Vec::new(),
        }
    }
}

/// An in-flight invocation: what the host will dispatch once hooks have run.
///
/// `command` is set either by the host (direct invocation) or by the alias
/// attach hook when an alias resolves. `args`/`options` hold the values that
/// will be passed to the command before the remaining `tokens` are parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Argv {
    pub tokens: Vec<Token>,
    pub command: Option<String>,
    /// Explicit entity name, set by hosts that address things other than commands.
    pub name: Option<String>,
    pub args: Vec<String>,
    pub options: Options,
    /// True for top-level messages, false for nested executions.
    pub root: bool,
    /// Name of the alias that rewrote this invocation, if any.
    pub alias: Option<String>,
}

impl Argv {
    /// A root-level invocation over the given tokens.
    pub fn root(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            root: true,
            ..Default::default()
        }
    }
}
