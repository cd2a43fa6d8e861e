use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::alias::Filter;
use crate::error::{AliasError, Result};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub groups: GroupsConfig,
    /// Alias configuration keyed by canonical command name.
    #[serde(default)]
    pub commands: BTreeMap<String, CommandAliasConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixMode {
    /// Channel messages need a prefix or mention; direct messages do not.
    #[default]
    Auto,
    /// Every message needs a prefix or mention.
    Strict,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub prefix_mode: PrefixMode,
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
    #[serde(default = "default_switch_authority")]
    pub switch_authority: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix_mode: PrefixMode::default(),
            prefixes: default_prefixes(),
            switch_authority: default_switch_authority(),
        }
    }
}

fn default_prefixes() -> Vec<String> {
    vec![String::new()]
}

fn default_switch_authority() -> u32 {
    3
}

/// A set of mutually exclusive alias-group tags, each with its strict flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ExclusivitySet(pub BTreeMap<String, bool>);

impl ExclusivitySet {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    pub fn is_strict(&self, tag: &str) -> bool {
        self.0.get(tag).copied().unwrap_or(false)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupsConfig {
    #[serde(default)]
    pub exclusive: Vec<ExclusivitySet>,
}

impl GroupsConfig {
    /// The first exclusivity set declaring `tag`.
    pub fn set_of(&self, tag: &str) -> Option<&ExclusivitySet> {
        self.exclusive.iter().find(|set| set.contains(tag))
    }

    /// An empty configuration: no exclusivity sets, every tag fails open.
    pub fn ungrouped() -> Self {
        Self::default()
    }
}

/// Per-command alias configuration, merged into a command when it registers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CommandAliasConfig {
    #[serde(default)]
    pub aliases: Vec<AliasConfig>,
    /// Group applied to aliases that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_alias_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AliasConfig {
    pub name: String,
    /// Raw argument string parsed once against the owning command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl AliasConfig {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            alias_group: None,
            filter: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.alias_group = Some(group.to_string());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    /// Commands whose alias configuration is dropped entirely.
    #[serde(default)]
    remove_commands: Vec<String>,
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    groups: GroupsOverlay,
    #[serde(default)]
    commands: BTreeMap<String, CommandAliasConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    prefix_mode: Option<PrefixMode>,
    switch_authority: Option<u32>,
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    prefixes: Vec<String>,
    #[serde(default)]
    remove_prefixes: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct GroupsOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    exclusive: Vec<ExclusivitySet>,
    /// Tags removed from every exclusivity set.
    #[serde(default)]
    remove: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list<T: PartialEq>(base: &mut Vec<T>, add: Vec<T>, remove: &[T], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/chat-alias/config.toml (if exists)
    ///
    /// A malformed user overlay is reported and ignored.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config.log_warnings();
        config
    }

    /// Load defaults merged with an explicit overlay file. Unlike [`Config::load`],
    /// an unreadable or malformed file is an error.
    pub fn load_from(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let content = std::fs::read_to_string(Path::new(expanded.as_ref()))
            .map_err(|e| AliasError::Config(format!("{expanded}: {e}")))?;
        let overlay: ConfigOverlay = toml::from_str(&content)
            .map_err(|e| AliasError::Config(format!("{expanded}: {e}")))?;
        let mut config = Self::default_config();
        config.apply_overlay(overlay);
        config.log_warnings();
        Ok(config)
    }

    /// Try to load user overlay from ~/.config/chat-alias/config.toml.
    fn load_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = Path::new(&home).join(".config/chat-alias/config.toml");
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                warn!("config parse error: {e}");
                eprintln!("chat-alias: config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        if let Some(v) = s.prefix_mode {
            self.settings.prefix_mode = v;
        }
        if let Some(v) = s.switch_authority {
            self.settings.switch_authority = v;
        }
        merge_list(
            &mut self.settings.prefixes,
            s.prefixes,
            &s.remove_prefixes,
            s.replace,
        );

        let g = overlay.groups;
        merge_list(&mut self.groups.exclusive, g.exclusive, &[], g.replace);
        if !g.remove.is_empty() {
            for set in &mut self.groups.exclusive {
                set.0.retain(|tag, _| !g.remove.contains(tag));
            }
            self.groups.exclusive.retain(|set| !set.0.is_empty());
        }

        for name in &overlay.remove_commands {
            self.commands.remove(name);
        }
        // Per-command entries replace whole
        self.commands.extend(overlay.commands);
    }

    /// Configuration problems worth reporting but not fatal.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut seen: Vec<&str> = Vec::new();
        for set in &self.groups.exclusive {
            for tag in set.tags() {
                if seen.contains(&tag) {
                    warnings.push(format!(
                        "alias group {tag:?} is declared in more than one exclusivity set"
                    ));
                } else {
                    seen.push(tag);
                }
            }
        }

        for (command, cfg) in &self.commands {
            let groups = cfg
                .aliases
                .iter()
                .filter_map(|a| a.alias_group.as_deref())
                .chain(cfg.default_alias_group.as_deref());
            for tag in groups {
                if tag != crate::alias::GLOBAL_GROUP && self.groups.set_of(tag).is_none() {
                    warnings.push(format!(
                        "command {command:?} references undeclared alias group {tag:?}; it will always be visible"
                    ));
                }
            }
        }

        warnings
    }

    fn log_warnings(&self) {
        for w in self.warnings() {
            warn!("{w}");
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert_eq!(config.settings.prefix_mode, PrefixMode::Auto);
        assert_eq!(config.settings.prefixes, vec![""]);
        assert_eq!(config.settings.switch_authority, 3);
        assert!(config.groups.exclusive.is_empty());
        assert!(config.commands.is_empty());
    }

    #[test]
    fn overlay_groups_and_commands() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [groups]
            exclusive = [{ g1 = false, g2 = true }]

            [commands.baz]
            default_alias_group = "g2"
            aliases = [{ name = "zab" }, { name = "zz", source = "--flag value", filter = false }]
        "#,
        );
        let set = config.groups.set_of("g2").unwrap();
        assert!(set.is_strict("g2"));
        assert!(!set.is_strict("g1"));
        let baz = &config.commands["baz"];
        assert_eq!(baz.default_alias_group.as_deref(), Some("g2"));
        assert_eq!(baz.aliases.len(), 2);
        assert_eq!(baz.aliases[1].source.as_deref(), Some("--flag value"));
        assert_eq!(baz.aliases[1].filter, Some(Filter::Static(false)));
    }

    #[test]
    fn overlay_exclusive_sets_deduped() {
        let mut config = Config::default_config();
        let overlay = r#"
            [groups]
            exclusive = [{ a = true, b = false }]
        "#;
        config.apply_overlay_str(overlay);
        config.apply_overlay_str(overlay);
        assert_eq!(config.groups.exclusive.len(), 1);
    }

    #[test]
    fn overlay_removes_group_tags() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [groups]
            exclusive = [{ a = true, b = false }, { c = true }]
        "#,
        );
        config.apply_overlay_str(
            r#"
            [groups]
            remove = ["b", "c"]
        "#,
        );
        assert_eq!(config.groups.exclusive.len(), 1);
        assert!(config.groups.set_of("a").is_some());
        assert!(config.groups.set_of("b").is_none());
    }

    #[test]
    fn overlay_replace_groups() {
        let mut config = Config::default_config();
        config.apply_overlay_str(r#"groups = { exclusive = [{ a = true }] }"#);
        config.apply_overlay_str(
            r#"
            [groups]
            replace = true
            exclusive = [{ z = false }]
        "#,
        );
        assert!(config.groups.set_of("a").is_none());
        assert!(config.groups.set_of("z").is_some());
    }

    #[test]
    fn overlay_settings_scalars_and_prefixes() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            prefix_mode = "strict"
            switch_authority = 4
            prefixes = ["/", "!"]
            remove_prefixes = [""]
        "#,
        );
        assert_eq!(config.settings.prefix_mode, PrefixMode::Strict);
        assert_eq!(config.settings.switch_authority, 4);
        assert_eq!(config.settings.prefixes, vec!["/", "!"]);
    }

    #[test]
    fn overlay_command_entry_replaces_whole() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [commands.bar]
            default_alias_group = "g1"
            aliases = [{ name = "rab" }]
        "#,
        );
        config.apply_overlay_str(
            r#"
            [commands.bar]
            aliases = [{ name = "b" }]
        "#,
        );
        let bar = &config.commands["bar"];
        assert_eq!(bar.aliases, vec![AliasConfig::named("b")]);
        assert!(bar.default_alias_group.is_none());
    }

    #[test]
    fn overlay_remove_commands() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [commands.bar]
            aliases = [{ name = "rab" }]
        "#,
        );
        config.apply_overlay_str(r#"remove_commands = ["bar"]"#);
        assert!(config.commands.is_empty());
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.settings.prefixes, vec![""]);
        assert!(config.groups.exclusive.is_empty());
    }

    #[test]
    fn warns_on_duplicate_and_undeclared_groups() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [groups]
            exclusive = [{ a = true }, { a = false, b = true }]

            [commands.foo]
            aliases = [{ name = "f", alias_group = "typo" }, { name = "g", alias_group = "*" }]
        "#,
        );
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("\"a\""));
        assert!(warnings[1].contains("\"typo\""));
    }

    #[test]
    fn load_from_missing_file_is_error() {
        let err = Config::load_from("/nonexistent/chat-alias.toml").unwrap_err();
        assert!(matches!(err, AliasError::Config(_)));
    }
}
