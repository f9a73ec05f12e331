//! Glob Pattern Module
//!
//! Key matching for pattern invalidation. `*` matches any substring; every
//! other character matches itself.

use regex::Regex;

// == Key Pattern ==
/// Compiled glob over cache keys.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    /// None when the glob could not be compiled; such a pattern matches nothing
    regex: Option<Regex>,
}

impl KeyPattern {
    // == Constructor ==
    /// Compiles a glob. Never fails: a pattern that cannot be compiled matches no key.
    pub fn new(glob: &str) -> Self {
        let body = glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = match Regex::new(&format!("^{body}$")) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!("Pattern '{}' could not be compiled, matching nothing: {}", glob, e);
                None
            }
        };

        Self { regex }
    }

    // == Matches ==
    pub fn matches(&self, key: &str) -> bool {
        self.regex.as_ref().is_some_and(|regex| regex.is_match(key))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let pattern = KeyPattern::new("model:1");
        assert!(pattern.matches("model:1"));
        assert!(!pattern.matches("model:10"));
        assert!(!pattern.matches("xmodel:1"));
    }

    #[test]
    fn test_prefix_wildcard() {
        let pattern = KeyPattern::new("model:*");
        assert!(pattern.matches("model:1"));
        assert!(pattern.matches("model:all"));
        assert!(pattern.matches("model:"));
        assert!(!pattern.matches("experiment:1"));
    }

    #[test]
    fn test_inner_and_suffix_wildcards() {
        let pattern = KeyPattern::new("run:*:metrics");
        assert!(pattern.matches("run:42:metrics"));
        assert!(!pattern.matches("run:42:params"));

        let pattern = KeyPattern::new("*:all");
        assert!(pattern.matches("model:all"));
        assert!(pattern.matches("pipeline:all"));
        assert!(!pattern.matches("pipeline:allx"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = KeyPattern::new("report.(v1)+[x]*");
        assert!(pattern.matches("report.(v1)+[x]-2024"));
        assert!(!pattern.matches("reportX(v1)+[x]"));
    }

    #[test]
    fn test_star_matches_everything() {
        let pattern = KeyPattern::new("*");
        assert!(pattern.matches(""));
        assert!(pattern.matches("anything:at:all"));
    }
}
