use std::collections::HashMap;

use crate::error::Result;

/// Identifies a channel across platforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelKey {
    pub platform: String,
    pub id: String,
}

impl ChannelKey {
    pub fn new(platform: &str, id: &str) -> Self {
        Self {
            platform: platform.to_string(),
            id: id.to_string(),
        }
    }
}

/// Persistence of the per-channel `alias_groups` field.
pub trait ChannelStore {
    /// Active alias-group tags. Unknown channels have none.
    fn alias_groups(&self, key: &ChannelKey) -> Result<Vec<String>>;

    fn set_alias_groups(&mut self, key: &ChannelKey, groups: Vec<String>) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelRecord {
    pub alias_groups: Vec<String>,
}

/// In-memory channel records. Writing to a channel that has no record yet
/// creates one.
#[derive(Debug, Default)]
pub struct MemoryChannelStore {
    channels: HashMap<ChannelKey, ChannelRecord>,
}

impl MemoryChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) a channel record.
    pub fn init_channel(&mut self, key: ChannelKey) {
        self.channels.insert(key, ChannelRecord::default());
    }

    pub fn record(&self, key: &ChannelKey) -> Option<&ChannelRecord> {
        self.channels.get(key)
    }
}

impl ChannelStore for MemoryChannelStore {
    fn alias_groups(&self, key: &ChannelKey) -> Result<Vec<String>> {
        Ok(self
            .channels
            .get(key)
            .map(|r| r.alias_groups.clone())
            .unwrap_or_default())
    }

    fn set_alias_groups(&mut self, key: &ChannelKey, groups: Vec<String>) -> Result<()> {
        self.channels.entry(key.clone()).or_default().alias_groups = groups;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_channel_reads_empty() {
        let store = MemoryChannelStore::new();
        assert!(store.alias_groups(&ChannelKey::new("mock", "1")).unwrap().is_empty());
    }

    #[test]
    fn unknown_channel_write_creates_record() {
        let mut store = MemoryChannelStore::new();
        let key = ChannelKey::new("mock", "1");
        store.set_alias_groups(&key, vec!["g1".into()]).unwrap();
        assert_eq!(store.alias_groups(&key).unwrap(), vec!["g1"]);
        assert_eq!(
            store.record(&key),
            Some(&ChannelRecord {
                alias_groups: vec!["g1".into()]
            })
        );
    }

    #[test]
    fn write_then_read() {
        let mut store = MemoryChannelStore::new();
        let key = ChannelKey::new("mock", "321");
        store.init_channel(key.clone());
        store.set_alias_groups(&key, vec!["g1".into()]).unwrap();
        assert_eq!(store.alias_groups(&key).unwrap(), vec!["g1"]);
    }
}
