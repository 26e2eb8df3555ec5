use std::collections::HashSet;

/// Identifiers already notified during this process lifetime.
///
/// Append-only: an identifier is never removed once recorded, so a key that
/// disappears from the store and comes back is not reported again.
#[derive(Debug, Default, Clone)]
pub struct SeenSet {
    keys: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot and return the identifiers not seen before,
    /// in snapshot order. Repeats within one snapshot are reported once.
    pub fn observe<I>(&mut self, snapshot: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        snapshot
            .into_iter()
            .filter(|key| self.keys.insert(key.clone()))
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
