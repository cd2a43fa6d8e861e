pub mod args;
pub mod tokenize;
pub mod types;

pub use args::{CommandParser, OptionKind, OptionSpec, ParsedArgs};
pub use tokenize::tokenize;
pub use types::{Argv, Options, Token};
