use super::record::AliasRecord;

/// Ordered collection of alias records, partitioned by owning command.
///
/// Writers only ever replace or remove the whole partition of one command,
/// so a reader observes either the old or the new set for that command.
#[derive(Debug, Default)]
pub struct AliasStore {
    records: Vec<AliasRecord>,
}

impl AliasStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every record owned by `command`, then append `records`.
    pub fn replace_owner(&mut self, command: &str, records: Vec<AliasRecord>) {
        self.records.retain(|r| r.command != command);
        self.records.extend(records);
    }

    /// Remove every record owned by `command`. Returns how many were removed.
    pub fn remove_owner(&mut self, command: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.command != command);
        before - self.records.len()
    }

    /// First record (in store order) named `name` that passes `visible`.
    pub fn find(&self, name: &str, visible: impl Fn(&AliasRecord) -> bool) -> Option<&AliasRecord> {
        self.records.iter().find(|r| r.name == name && visible(r))
    }

    pub fn owned_by<'a>(&'a self, command: &'a str) -> impl Iterator<Item = &'a AliasRecord> {
        self.records.iter().filter(move |r| r.command == command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AliasRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
