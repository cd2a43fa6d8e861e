use std::fmt;

use log::info;

use crate::config::GroupsConfig;
use crate::error::Result;
use crate::host::{ChannelKey, ChannelStore};

/// Registered name of the group switch command.
pub const SWITCH_COMMAND: &str = "alias.switch";

/// User-visible result of a switch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// No exclusivity set declares the group.
    NotFound(String),
    /// The group was already active.
    Unchanged(String),
    Switched {
        group: String,
        /// Sibling tags that were deselected.
        evicted: Vec<String>,
    },
    /// No group given: the channel's current selection.
    Listed(Vec<String>),
}

impl fmt::Display for SwitchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchOutcome::NotFound(g) => write!(f, "group not found: {g}"),
            SwitchOutcome::Unchanged(g) => write!(f, "unchanged: {g} is already active"),
            SwitchOutcome::Switched { group, .. } => write!(f, "success: switched to {group}"),
            SwitchOutcome::Listed(groups) if groups.is_empty() => f.write_str("no active groups"),
            SwitchOutcome::Listed(groups) => write!(f, "active groups: {}", groups.join(", ")),
        }
    }
}

/// Apply a switch to `selection` in place: evict the group's siblings, then
/// append it.
pub fn apply(groups: &GroupsConfig, selection: &mut Vec<String>, group: &str) -> SwitchOutcome {
    let Some(set) = groups.set_of(group) else {
        return SwitchOutcome::NotFound(group.to_string());
    };
    if selection.iter().any(|s| s == group) {
        return SwitchOutcome::Unchanged(group.to_string());
    }

    let mut evicted = Vec::new();
    selection.retain(|s| {
        let sibling = set.contains(s);
        if sibling {
            evicted.push(s.clone());
        }
        !sibling
    });
    selection.push(group.to_string());

    SwitchOutcome::Switched {
        group: group.to_string(),
        evicted,
    }
}

/// Load the channel's selection, switch it to `group` and persist it.
/// Without a group, report the current selection.
pub fn switch_group<S: ChannelStore>(
    groups: &GroupsConfig,
    store: &mut S,
    channel: &ChannelKey,
    group: Option<&str>,
) -> Result<SwitchOutcome> {
    let mut selection = store.alias_groups(channel)?;
    let Some(group) = group else {
        return Ok(SwitchOutcome::Listed(selection));
    };

    let outcome = apply(groups, &mut selection, group);
    if let SwitchOutcome::Switched { evicted, .. } = &outcome {
        store.set_alias_groups(channel, selection)?;
        info!(
            "channel {}:{} switched to alias group {group:?} (evicted {evicted:?})",
            channel.platform, channel.id
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExclusivitySet;
    use crate::host::MemoryChannelStore;

    fn groups() -> GroupsConfig {
        GroupsConfig {
            exclusive: vec![
                ExclusivitySet([("g1".to_string(), false), ("g2".to_string(), true)].into()),
                ExclusivitySet([("x".to_string(), false)].into()),
            ],
        }
    }

    fn sel(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unknown_group_not_found() {
        let mut selection = sel(&["g1"]);
        assert_eq!(
            apply(&groups(), &mut selection, "nope"),
            SwitchOutcome::NotFound("nope".into())
        );
        assert_eq!(selection, sel(&["g1"]));
    }

    #[test]
    fn active_group_unchanged() {
        let mut selection = sel(&["g1"]);
        assert_eq!(
            apply(&groups(), &mut selection, "g1"),
            SwitchOutcome::Unchanged("g1".into())
        );
    }

    #[test]
    fn switch_evicts_siblings_only() {
        let mut selection = sel(&["x", "g1"]);
        let outcome = apply(&groups(), &mut selection, "g2");
        assert_eq!(
            outcome,
            SwitchOutcome::Switched {
                group: "g2".into(),
                evicted: sel(&["g1"]),
            }
        );
        assert_eq!(selection, sel(&["x", "g2"]));
    }

    #[test]
    fn switch_persists() {
        let mut store = MemoryChannelStore::new();
        let key = ChannelKey::new("mock", "321");
        store.init_channel(key.clone());
        switch_group(&groups(), &mut store, &key, Some("g1")).unwrap();
        assert_eq!(store.alias_groups(&key).unwrap(), sel(&["g1"]));
        switch_group(&groups(), &mut store, &key, Some("g2")).unwrap();
        assert_eq!(store.alias_groups(&key).unwrap(), sel(&["g2"]));
    }

    #[test]
    fn listing_current_groups() {
        let mut store = MemoryChannelStore::new();
        let key = ChannelKey::new("mock", "321");
        store.init_channel(key.clone());
        let outcome = switch_group(&groups(), &mut store, &key, None).unwrap();
        assert_eq!(outcome.to_string(), "no active groups");
        switch_group(&groups(), &mut store, &key, Some("x")).unwrap();
        let outcome = switch_group(&groups(), &mut store, &key, None).unwrap();
        assert_eq!(outcome.to_string(), "active groups: x");
    }

    #[test]
    fn messages() {
        assert_eq!(SwitchOutcome::NotFound("q".into()).to_string(), "group not found: q");
        assert!(SwitchOutcome::Unchanged("g1".into()).to_string().starts_with("unchanged"));
        let switched = SwitchOutcome::Switched {
            group: "g1".into(),
            evicted: vec![],
        };
        assert!(switched.to_string().starts_with("success"));
    }
}
