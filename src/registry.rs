//! Ordered, deduplicated set of usernames entered by the user.
//!
//! The lookup set lives on the registry instance itself, so two registries
//! never observe each other's values.

use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

/// Joins usernames in a batched lookup; never valid inside a username.
pub const SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameEntry {
    pub id: Uuid,
    pub value: String,
}

#[derive(Debug, Default, Clone)]
pub struct UsernameRegistry {
    entries: Vec<UsernameEntry>,
    seen: HashSet<String>,
}

impl UsernameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits `input` as a new entry.
    ///
    /// Empty input and values already present (exact, case-sensitive match)
    /// are ignored. On commit the input buffer is cleared, mirroring a text
    /// field that empties after Enter; on a no-op it is left untouched.
    pub fn commit(&mut self, input: &mut String) -> Option<Uuid> {
        let id = self.add(input.as_str())?;
        input.clear();
        Some(id)
    }

    /// Adds `value`, returning the new entry's id, or `None` if nothing changed.
    ///
    /// Values containing [`SEPARATOR`] are rejected: the batch request joins
    /// usernames with it, so such a value would be split into other users.
    pub fn add(&mut self, value: &str) -> Option<Uuid> {
        if value.contains(SEPARATOR) {
            warn!(value, "ignoring username containing a separator");
            return None;
        }
        if value.is_empty() || self.seen.contains(value) {
            debug!(value, "ignoring empty or duplicate username");
            return None;
        }

        let id = Uuid::new_v4();
        self.entries.push(UsernameEntry {
            id,
            value: value.to_string(),
        });
        self.seen.insert(value.to_string());
        debug!(value, %id, "added username");
        Some(id)
    }

    /// Removes the entry with `id`. Unknown ids leave the registry unchanged.
    pub fn remove(&mut self, id: Uuid) -> Option<UsernameEntry> {
        let Some(idx) = self.entries.iter().position(|e| e.id == id) else {
            warn!(%id, "remove called with unknown username id");
            return None;
        };

        let entry = self.entries.remove(idx);
        self.seen.remove(&entry.value);
        debug!(value = %entry.value, %id, "removed username");
        Some(entry)
    }

    pub fn find(&self, value: &str) -> Option<&UsernameEntry> {
        self.entries.iter().find(|e| e.value == value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn entries(&self) -> &[UsernameEntry] {
        &self.entries
    }

    /// Values in insertion order.
    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.value.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
