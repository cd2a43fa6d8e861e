//! Command argument grammar: positional args plus declared long/short options.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{Options, Token};
use crate::error::ParseError;

/// How an option consumes input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Boolean switch; `--no-<name>` sets it false.
    Flag,
    /// Takes the next word as a string.
    Text,
    /// Takes the next word as a signed integer.
    Integer,
}

/// A declared option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    #[serde(default)]
    pub short: Option<char>,
    pub kind: OptionKind,
}

/// Positional arguments and options produced by [`CommandParser`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    pub args: Vec<String>,
    pub options: Options,
}

/// Argument parser owned by a command.
///
/// In strict mode (the default) undeclared options are rejected. A lenient
/// parser accepts any option: `--name=value` becomes a string, a bare
/// `--name` or `-n` becomes `true`.
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    options: Vec<OptionSpec>,
    lenient: bool,
}

impl CommandParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self {
            options: Vec::new(),
            lenient: true,
        }
    }

    /// Declare a long option.
    pub fn option(mut self, name: &str, kind: OptionKind) -> Self {
        self.options.push(OptionSpec {
            name: name.to_string(),
            short: None,
            kind,
        });
        self
    }

    /// Declare an option with a one-letter short form.
    pub fn option_short(mut self, name: &str, short: char, kind: OptionKind) -> Self {
        self.options.push(OptionSpec {
            name: name.to_string(),
            short: Some(short),
            kind,
        });
        self
    }

    /// Parse a raw argument string (POSIX word splitting via shlex).
    pub fn parse(&self, raw: &str) -> Result<ParsedArgs, ParseError> {
        let words = shlex::split(raw).ok_or_else(|| ParseError::UnterminatedQuote(raw.to_string()))?;
        let words: Vec<(String, bool)> = words.into_iter().map(|w| (w, false)).collect();
        self.parse_words(&words)
    }

    /// Parse already-tokenized message words. Quoted tokens are never options.
    pub fn parse_tokens(&self, tokens: &[Token]) -> Result<ParsedArgs, ParseError> {
        let words: Vec<(String, bool)> = tokens
            .iter()
            .map(|t| (t.content.clone(), t.quoted))
            .collect();
        self.parse_words(&words)
    }

    fn long(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    fn short(&self, c: char) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.short == Some(c))
    }

    fn parse_words(&self, words: &[(String, bool)]) -> Result<ParsedArgs, ParseError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = words.iter();
        let mut rest_positional = false;

        while let Some((word, quoted)) = iter.next() {
            if rest_positional || *quoted || !is_option_like(word) {
                parsed.args.push(word.clone());
                continue;
            }
            if word == "--" {
                rest_positional = true;
                continue;
            }

            if let Some(body) = word.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((n, v)) => (n, Some(v.to_string())),
                    None => (body, None),
                };
                self.apply_long(name, inline, &mut iter, &mut parsed.options)?;
            } else {
                let shorts: Vec<char> = word[1..].chars().collect();
                for (idx, c) in shorts.iter().enumerate() {
                    let last = idx + 1 == shorts.len();
                    match self.short(*c) {
                        Some(spec) if spec.kind == OptionKind::Flag => {
                            parsed.options.insert(spec.name.clone(), Value::Bool(true));
                        }
                        Some(spec) if last => {
                            let value = next_value(&spec.name, &mut iter)?;
                            let value = typed(spec, value)?;
                            parsed.options.insert(spec.name.clone(), value);
                        }
                        Some(spec) => return Err(ParseError::MissingValue(spec.name.clone())),
                        None if self.lenient => {
                            parsed.options.insert(c.to_string(), Value::Bool(true));
                        }
                        None => return Err(ParseError::UnknownOption(format!("-{c}"))),
                    }
                }
            }
        }

        Ok(parsed)
    }

    fn apply_long<'a>(
        &self,
        name: &str,
        inline: Option<String>,
        iter: &mut impl Iterator<Item = &'a (String, bool)>,
        options: &mut Options,
    ) -> Result<(), ParseError> {
        if let Some(spec) = self.long(name) {
            let value = match (spec.kind, inline) {
                (OptionKind::Flag, None) => Value::Bool(true),
                (OptionKind::Flag, Some(v)) => Value::Bool(v != "false"),
                (_, Some(v)) => typed(spec, v)?,
                (_, None) => typed(spec, next_value(&spec.name, iter)?)?,
            };
            options.insert(spec.name.clone(), value);
            return Ok(());
        }

        // --no-<flag>
        if let Some(negated) = name.strip_prefix("no-")
            && let Some(spec) = self.long(negated)
            && spec.kind == OptionKind::Flag
        {
            options.insert(spec.name.clone(), Value::Bool(false));
            return Ok(());
        }

        if self.lenient {
            let value = inline.map(Value::String).unwrap_or(Value::Bool(true));
            options.insert(name.to_string(), value);
            return Ok(());
        }

        Err(ParseError::UnknownOption(format!("--{name}")))
    }
}

/// `-x`, `--x`, `--`; but not `-`, or negative numbers like `-5`.
fn is_option_like(word: &str) -> bool {
    let Some(rest) = word.strip_prefix('-') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    rest.parse::<f64>().is_err()
}

fn next_value<'a>(
    name: &str,
    iter: &mut impl Iterator<Item = &'a (String, bool)>,
) -> Result<String, ParseError> {
    iter.next()
        .map(|(w, _)| w.clone())
        .ok_or_else(|| ParseError::MissingValue(name.to_string()))
}

fn typed(spec: &OptionSpec, value: String) -> Result<Value, ParseError> {
    match spec.kind {
        OptionKind::Integer => value
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| ParseError::InvalidInteger {
                option: spec.name.clone(),
                value,
            }),
        OptionKind::Flag => Ok(Value::Bool(value != "false")),
        OptionKind::Text => Ok(Value::String(value)),
    }
}
