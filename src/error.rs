//! Error types shared across the crate.

use thiserror::Error;

/// Failure to parse an argument string against a command's grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated quote in {0:?}")]
    UnterminatedQuote(String),
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("option --{0} expects a value")]
    MissingValue(String),
    #[error("option --{option} expects an integer, got {value:?}")]
    InvalidInteger { option: String, value: String },
}

#[derive(Debug, Error)]
pub enum AliasError {
    /// An alias `source` string was rejected by its owning command's parser.
    #[error("alias {alias:?} of command {command:?}: {source}")]
    Parse {
        command: String,
        alias: String,
        #[source]
        source: ParseError,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("channel store error: {0}")]
    ChannelStore(String),
}

pub type Result<T, E = AliasError> = std::result::Result<T, E>;
