//! Dotted-key alias resolution with indirection.

use log::trace;

use super::filter::FilterContext;
use super::group;
use super::record::AliasRecord;
use super::store::AliasStore;
use crate::config::GroupsConfig;

/// What a lookup may consult about the current message.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveContext<'a> {
    /// Active alias-group tags of the current channel.
    pub selection: &'a [String],
    /// Session snapshot for filters. `None` lets dynamic filters pass.
    pub filter: Option<&'a FilterContext>,
}

/// Result of resolving one key.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// The last name looked up.
    pub name: String,
    /// The alias matched for the full key, if any.
    pub alias: Option<&'a AliasRecord>,
    /// Every alias matched on the way, outermost first.
    pub chain: Vec<&'a AliasRecord>,
}

impl<'a> Resolution<'a> {
    fn miss(name: String, chain: Vec<&'a AliasRecord>) -> Self {
        Self {
            name,
            alias: None,
            chain,
        }
    }
}

pub struct Resolver<'a> {
    store: &'a AliasStore,
    groups: &'a GroupsConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a AliasStore, groups: &'a GroupsConfig) -> Self {
        Self { store, groups }
    }

    /// First alias in store order named `name` that is visible and passes its filter.
    pub fn get(&self, name: &str, ctx: &ResolveContext<'_>) -> Option<&'a AliasRecord> {
        self.store.find(name, |alias| {
            group::visible(alias.group.as_deref(), ctx.selection, self.groups)
                && alias.filter.evaluate(ctx.filter)
        })
    }

    /// Resolve a dot-joined key such as `"a.b.c"`.
    ///
    /// Each further segment is looked up relative to the name of the alias
    /// matched so far, so the loop runs at most once per segment.
    pub fn resolve(&self, key: &str, ctx: &ResolveContext<'_>) -> Resolution<'a> {
        if key.is_empty() {
            return Resolution::miss(String::new(), Vec::new());
        }

        let key = key.to_lowercase();
        let mut segments = key.split('.');
        // split always yields at least one item
        let mut name = segments.next().unwrap_or_default().to_string();
        let mut chain = Vec::new();

        loop {
            let Some(alias) = self.get(&name, ctx) else {
                trace!("no alias for {name:?}");
                return Resolution::miss(name, chain);
            };
            chain.push(alias);
            match segments.next() {
                Some(segment) => name = format!("{}.{}", alias.name, segment),
                None => {
                    return Resolution {
                        name,
                        alias: Some(alias),
                        chain,
                    };
                }
            }
        }
    }
}
