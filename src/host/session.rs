use super::channel::ChannelKey;
use crate::alias::FilterContext;

/// An inbound message and who sent it where.
#[derive(Debug, Clone)]
pub struct Session {
    pub platform: String,
    pub user_id: String,
    /// `None` for direct messages.
    pub channel_id: Option<String>,
    pub guild_id: Option<String>,
    pub authority: u32,
    /// Whether the message mentions the bot.
    pub mentioned: bool,
    pub content: String,
}

/// Message content with its address removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub content: String,
    /// The matched prefix, `None` if no configured prefix matched.
    pub prefix: Option<String>,
    pub appel: bool,
}

impl Session {
    pub fn direct(user_id: &str, content: &str) -> Self {
        Self {
            platform: "mock".into(),
            user_id: user_id.into(),
            channel_id: None,
            guild_id: None,
            authority: 1,
            mentioned: false,
            content: content.into(),
        }
    }

    pub fn channel(user_id: &str, channel_id: &str, content: &str) -> Self {
        Self {
            channel_id: Some(channel_id.into()),
            guild_id: Some(channel_id.into()),
            ..Self::direct(user_id, content)
        }
    }

    pub fn with_authority(mut self, authority: u32) -> Self {
        self.authority = authority;
        self
    }

    pub fn with_mention(mut self) -> Self {
        self.mentioned = true;
        self
    }

    pub fn is_direct(&self) -> bool {
        self.channel_id.is_none()
    }

    pub fn channel_key(&self) -> Option<ChannelKey> {
        self.channel_id
            .as_deref()
            .map(|id| ChannelKey::new(&self.platform, id))
    }

    pub fn filter_context(&self) -> FilterContext {
        FilterContext {
            platform: self.platform.clone(),
            user_id: self.user_id.clone(),
            channel_id: self.channel_id.clone(),
            guild_id: self.guild_id.clone(),
            is_direct: self.is_direct(),
            authority: self.authority,
        }
    }

    /// Strip the longest matching prefix from the content.
    pub fn strip(&self, prefixes: &[String]) -> Stripped {
        let mut sorted: Vec<&String> = prefixes.iter().collect();
        sorted.sort_by_key(|p| std::cmp::Reverse(p.len()));

        let content = self.content.trim_start();
        for prefix in sorted {
            if let Some(rest) = content.strip_prefix(prefix.as_str()) {
                return Stripped {
                    content: rest.trim_start().to_string(),
                    prefix: Some(prefix.clone()),
                    appel: self.mentioned,
                };
            }
        }
        Stripped {
            content: content.to_string(),
            prefix: None,
            appel: self.mentioned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strip_longest_prefix() {
        let s = Session::direct("1", "//zab").strip(&prefixes(&["/", "//"]));
        assert_eq!(s.prefix.as_deref(), Some("//"));
        assert_eq!(s.content, "zab");
    }

    #[test]
    fn empty_prefix_matches_everything() {
        let s = Session::direct("1", "zab").strip(&prefixes(&[""]));
        assert_eq!(s.prefix.as_deref(), Some(""));
        assert_eq!(s.content, "zab");
    }

    #[test]
    fn no_prefix() {
        let s = Session::channel("1", "2", "zab").strip(&prefixes(&["/"]));
        assert!(s.prefix.is_none());
        assert!(!s.appel);
    }

    #[test]
    fn filter_context_snapshot() {
        let ctx = Session::channel("1", "2", "x").with_authority(4).filter_context();
        assert_eq!(ctx.channel_id.as_deref(), Some("2"));
        assert!(!ctx.is_direct);
        assert_eq!(ctx.authority, 4);
    }
}
