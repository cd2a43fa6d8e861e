//! Per-alias runtime filters.
//!
//! A filter is evaluated against a [`FilterContext`] snapshot of the current
//! session. Filters from configuration are either a plain boolean or a
//! [`FilterRule`]; code can also install an arbitrary predicate.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

/// The session fields a filter may read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterContext {
    pub platform: String,
    pub user_id: String,
    pub channel_id: Option<String>,
    pub guild_id: Option<String>,
    pub is_direct: bool,
    pub authority: u32,
}

/// Declarative filter: every non-empty field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platform: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guild: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_authority: Option<u32>,
}

impl FilterRule {
    pub fn matches(&self, ctx: &FilterContext) -> bool {
        fn listed(list: &[String], value: Option<&str>) -> bool {
            list.is_empty() || value.is_some_and(|v| list.iter().any(|x| x == v))
        }

        listed(&self.platform, Some(&ctx.platform))
            && listed(&self.user, Some(&ctx.user_id))
            && listed(&self.channel, ctx.channel_id.as_deref())
            && listed(&self.guild, ctx.guild_id.as_deref())
            && self.direct.is_none_or(|d| d == ctx.is_direct)
            && self.min_authority.is_none_or(|a| ctx.authority >= a)
    }
}

/// Wire form of a filter in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FilterConfig {
    Static(bool),
    Rule(FilterRule),
}

pub type Predicate = Arc<dyn Fn(&FilterContext) -> bool + Send + Sync>;

#[derive(Clone, Default, Deserialize)]
#[serde(from = "FilterConfig")]
pub enum Filter {
    #[default]
    Always,
    Static(bool),
    Rule(FilterRule),
    /// Arbitrary predicate installed from code. Never comes from config.
    Computed(Predicate),
}

impl Filter {
    pub fn computed(f: impl Fn(&FilterContext) -> bool + Send + Sync + 'static) -> Self {
        Filter::Computed(Arc::new(f))
    }

    /// Evaluate against a session snapshot. Without one, only the static
    /// shapes can fail.
    pub fn evaluate(&self, ctx: Option<&FilterContext>) -> bool {
        match (self, ctx) {
            (Filter::Always, _) => true,
            (Filter::Static(b), _) => *b,
            (Filter::Rule(rule), Some(ctx)) => rule.matches(ctx),
            (Filter::Computed(f), Some(ctx)) => f(ctx),
            (_, None) => true,
        }
    }
}

impl From<FilterConfig> for Filter {
    fn from(cfg: FilterConfig) -> Self {
        match cfg {
            FilterConfig::Static(b) => Filter::Static(b),
            FilterConfig::Rule(rule) => Filter::Rule(rule),
        }
    }
}

impl From<bool> for Filter {
    fn from(b: bool) -> Self {
        Filter::Static(b)
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Filter::Always => serializer.serialize_bool(true),
            Filter::Static(b) => serializer.serialize_bool(*b),
            Filter::Rule(rule) => rule.serialize(serializer),
            Filter::Computed(_) => Err(serde::ser::Error::custom(
                "computed filters cannot be serialized",
            )),
        }
    }
}

// Closures compare by identity.
impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Filter::Always, Filter::Always) => true,
            (Filter::Static(a), Filter::Static(b)) => a == b,
            (Filter::Rule(a), Filter::Rule(b)) => a == b,
            (Filter::Computed(a), Filter::Computed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Always => f.write_str("Always"),
            Filter::Static(b) => f.debug_tuple("Static").field(b).finish(),
            Filter::Rule(rule) => f.debug_tuple("Rule").field(rule).finish(),
            Filter::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(direct: bool) -> FilterContext {
        FilterContext {
            platform: "mock".into(),
            user_id: "123".into(),
            channel_id: (!direct).then(|| "321".to_string()),
            guild_id: None,
            is_direct: direct,
            authority: 1,
        }
    }

    #[test]
    fn static_filters() {
        assert!(Filter::Always.evaluate(Some(&ctx(false))));
        assert!(!Filter::Static(false).evaluate(Some(&ctx(false))));
        assert!(!Filter::Static(false).evaluate(None));
    }

    #[test]
    fn rule_matches_fields() {
        let rule = FilterRule {
            platform: vec!["mock".into()],
            channel: vec!["321".into()],
            ..Default::default()
        };
        assert!(rule.matches(&ctx(false)));
        // direct messages have no channel id
        assert!(!rule.matches(&ctx(true)));
    }

    #[test]
    fn rule_direct_and_authority() {
        let rule = FilterRule {
            direct: Some(true),
            min_authority: Some(2),
            ..Default::default()
        };
        let mut c = ctx(true);
        assert!(!rule.matches(&c));
        c.authority = 2;
        assert!(rule.matches(&c));
    }

    #[test]
    fn context_free_evaluation_passes_dynamic_filters() {
        assert!(Filter::computed(|_| false).evaluate(None));
        assert!(Filter::Rule(FilterRule { direct: Some(true), ..Default::default() }).evaluate(None));
    }

    #[test]
    fn computed_filter() {
        let only_direct = Filter::computed(|c| c.is_direct);
        assert!(only_direct.evaluate(Some(&ctx(true))));
        assert!(!only_direct.evaluate(Some(&ctx(false))));
    }

    #[test]
    fn computed_equality_is_identity() {
        let a = Filter::computed(|_| true);
        let b = Filter::computed(|_| true);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn deserialize_shapes() {
        #[derive(Deserialize)]
        struct W {
            filter: Filter,
        }
        let w: W = toml::from_str("filter = false").unwrap();
        assert_eq!(w.filter, Filter::Static(false));
        let w: W = toml::from_str("filter = { user = [\"123\"] }").unwrap();
        assert!(matches!(w.filter, Filter::Rule(ref r) if r.user == vec!["123"]));
        assert!(toml::from_str::<W>("filter = { usr = [\"123\"] }").is_err());
    }
}
