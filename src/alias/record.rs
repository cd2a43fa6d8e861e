use serde::Serialize;

use super::filter::Filter;
use crate::parse::Options;

/// Group tag visible regardless of a channel's group selection.
pub const GLOBAL_GROUP: &str = "*";

/// One alias, built from its owning command's configuration at sync time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasRecord {
    /// Invocation key, lowercase.
    pub name: String,
    /// Canonical name of the owning command.
    pub command: String,
    pub source: Option<String>,
    /// Fixed positional args parsed from `source`.
    pub args: Vec<String>,
    /// Fixed options parsed from `source`.
    pub options: Options,
    pub group: Option<String>,
    #[serde(skip)]
    pub filter: Filter,
}

impl AliasRecord {
    /// A bare alias with no fixed arguments, visible everywhere.
    pub fn new(name: &str, command: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            command: command.to_string(),
            source: None,
            args: Vec::new(),
            options: Options::new(),
            group: None,
            filter: Filter::Always,
        }
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}
