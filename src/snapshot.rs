//! Immutable, versioned property snapshots
//!
//! A [`PropertySnapshot`] is one coherent view of configuration: a flat
//! key→string map tagged with a monotonically increasing version and a
//! creation timestamp. Snapshots are never mutated after construction;
//! a reload supersedes the whole snapshot at once.

use std::collections::HashMap;
use time::OffsetDateTime;

/// One coherent, read-only view of all configuration properties.
///
/// Snapshots are produced by the loader, published wholesale by the reload
/// machinery, and shared via `Arc` with every caller that reads through the
/// surface. A caller that holds a snapshot reference keeps seeing exactly
/// that version, no matter how many reloads happen in the meantime.
#[derive(Debug, Clone)]
pub struct PropertySnapshot {
    entries: HashMap<String, String>,
    version: u64,
    created_at: OffsetDateTime,
}

impl PropertySnapshot {
    pub(crate) fn new(entries: HashMap<String, String>, version: u64) -> Self {
        Self {
            entries,
            version,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Get the raw string value for a property key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Check whether a property key is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of properties in this snapshot
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if this snapshot holds no properties
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all property keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Monotonically increasing version stamp.
    ///
    /// Every successfully published snapshot carries a strictly greater
    /// version than its predecessor, including content-identical reloads.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// When this snapshot was constructed
    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Compare property contents with another snapshot, ignoring version
    /// and timestamp.
    #[must_use]
    pub fn same_contents(&self, other: &PropertySnapshot) -> bool {
        self.entries == other.entries
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(version: u64) -> PropertySnapshot {
        let mut entries = HashMap::new();
        entries.insert("server.port".into(), "8080".into());
        entries.insert("server.host".into(), "localhost".into());
        PropertySnapshot::new(entries, version)
    }

    #[test]
    fn test_lookup_and_len() {
        let snap = sample(1);
        assert_eq!(snap.get("server.port"), Some("8080"));
        assert_eq!(snap.get("missing"), None);
        assert!(snap.contains_key("server.host"));
        assert_eq!(snap.len(), 2);
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_version_stamp() {
        assert_eq!(sample(1).version(), 1);
        assert_eq!(sample(7).version(), 7);
    }

    #[test]
    fn test_same_contents_ignores_version() {
        let a = sample(1);
        let b = sample(2);
        assert!(a.same_contents(&b));
        assert_ne!(a.version(), b.version());

        let empty = PropertySnapshot::new(HashMap::new(), 3);
        assert!(!a.same_contents(&empty));
        assert!(empty.is_empty());
    }
}
