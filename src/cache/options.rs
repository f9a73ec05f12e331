//! Write options for cache entries.

use std::time::Duration;

// == Set Options ==
/// Per-write settings. Unset durations fall back to the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Fresh lifetime
    pub ttl: Option<Duration>,
    /// Stale window after the fresh lifetime; zero disables stale serving
    pub stale_ttl: Option<Duration>,
    /// Tags to register the key under
    pub tags: Vec<String>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn stale_ttl(mut self, stale_ttl: Duration) -> Self {
        self.stale_ttl = Some(stale_ttl);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = SetOptions::new()
            .ttl(Duration::from_secs(10))
            .stale_ttl(Duration::from_secs(20))
            .tag("models")
            .tags(["project:1", "owner:ana"]);

        assert_eq!(options.ttl, Some(Duration::from_secs(10)));
        assert_eq!(options.stale_ttl, Some(Duration::from_secs(20)));
        assert_eq!(options.tags, vec!["models", "project:1", "owner:ana"]);
    }

    #[test]
    fn test_default_is_empty() {
        let options = SetOptions::default();
        assert!(options.ttl.is_none());
        assert!(options.stale_ttl.is_none());
        assert!(options.tags.is_empty());
    }
}
