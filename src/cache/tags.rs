//! Tag Index Module
//!
//! Secondary mapping from tag to member keys for bulk invalidation.

use std::collections::{HashMap, HashSet};

// == Tag Index ==
/// Maps each tag to the set of keys registered under it.
///
/// Every key under a tag exists in the store; the store removes a key from
/// its tags eagerly on every removal. A tag whose set became empty stays
/// until it is invalidated or the index is cleared.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: HashMap<String, HashSet<String>>,
}

impl TagIndex {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Adds `key` to every tag in `tags`.
    pub fn register(&mut self, key: &str, tags: &[String]) {
        for tag in tags {
            self.tags
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
    }

    // == Unregister ==
    /// Removes `key` from every tag in `tags`.
    pub fn unregister(&mut self, key: &str, tags: &[String]) {
        for tag in tags {
            if let Some(keys) = self.tags.get_mut(tag) {
                keys.remove(key);
            }
        }
    }

    // == Take ==
    /// Drops a tag and returns the keys it referenced.
    pub fn take(&mut self, tag: &str) -> Vec<String> {
        self.tags
            .remove(tag)
            .map(|keys| keys.into_iter().collect())
            .unwrap_or_default()
    }

    /// Keys currently registered under `tag`.
    pub fn keys(&self, tag: &str) -> Option<&HashSet<String>> {
        self.tags.get(tag)
    }

    /// Iterates over every (tag, keys) pair.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &HashSet<String>)> {
        self.tags.iter()
    }

    /// Number of tags, including emptied ones.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}
