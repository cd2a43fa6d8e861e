use super::record::GLOBAL_GROUP;
use crate::config::GroupsConfig;

/// Whether an alias tagged `group` is visible in a channel whose active
/// group tags are `selection`.
///
/// - untagged or [`GLOBAL_GROUP`] aliases are always visible
/// - a selected tag is visible
/// - a tag no exclusivity set declares is visible
/// - a strict tag is visible while nothing from its set is selected
/// - anything else is hidden
pub fn visible(group: Option<&str>, selection: &[String], groups: &GroupsConfig) -> bool {
    let Some(tag) = group.filter(|t| !t.is_empty() && *t != GLOBAL_GROUP) else {
        return true;
    };
    if selection.iter().any(|s| s == tag) {
        return true;
    }
    let Some(set) = groups.set_of(tag) else {
        return true;
    };
    set.is_strict(tag) && !selection.iter().any(|s| set.contains(s))
}
