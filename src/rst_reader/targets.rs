use std::collections::HashMap;

use log::warn;

/// Result of resolving a reference name against the collected targets
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    /// An external uri
    Uri(String),
    /// An id of an internal target or a section
    Internal(String),
    /// No valid target with that name
    Unknown,
}

/// Hyperlink targets collected while parsing a document
#[derive(Debug, Default)]
pub struct Targets {
    /// External targets by stripped name, `None` once invalidated by a duplicate
    external: HashMap<String, Option<String>>,
    /// Internal targets and section titles by stripped name
    internal: HashMap<String, String>,
    /// Amount of times each id base was handed out
    used_ids: HashMap<String, usize>,
}

impl Targets {
    /// Creates a new empty collection of targets
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Strips a reference name for matching or inserting
    pub fn strip(key: &str) -> String {
        let mut space = false;
        let mut result = String::new();
        for c in key.trim().chars() {
            match c {
                ' ' | '\t' | '\n' => space = true,
                c => {
                    if space {
                        space = false;
                        result.push(' ');
                    }
                    for c in c.to_lowercase() {
                        result.push(c);
                    }
                },
            }
        }
        result
    }

    /// Derives an identifier from arbitrary text: lowercased, runs of anything
    /// that isn't alphanumeric collapsed into single hyphens
    pub fn make_id(text: &str) -> String {
        let mut result = String::new();
        let mut hyphen = false;
        for c in text.trim().chars() {
            if c.is_alphanumeric() {
                if hyphen && !result.is_empty() {
                    result.push('-');
                }
                hyphen = false;
                for c in c.to_lowercase() {
                    result.push(c);
                }
            } else {
                hyphen = true;
            }
        }
        result
    }

    /// Adds an external target. A second target with the same name invalidates
    /// both for resolution purposes.
    pub fn add_external(&mut self, name: &str, uri: &str) {
        let key = Self::strip(name);
        match self.external.get(&key) {
            Some(_) => {
                warn!("duplicate external target {key:?}, references will not resolve");
                self.external.insert(key, None);
            },
            None => {
                self.external.insert(key, Some(uri.to_owned()));
            },
        }
    }

    /// Adds an internal target or a section title, returning a document-unique
    /// id derived from the name. The first target with a given name wins.
    pub fn add_internal(&mut self, name: &str) -> String {
        let id = self.unique_id(Self::make_id(name));
        self.internal.entry(Self::strip(name)).or_insert_with(|| id.clone());
        id
    }

    /// Resolves a stripped reference name, following indirect target chains
    pub fn resolve(&self, name: &str) -> Resolved {
        let mut current = Self::strip(name);
        for _ in 0..32 {
            if let Some(entry) = self.external.get(&current) {
                return match entry {
                    Some(uri) => match Self::indirect(uri) {
                        Some(next) => {
                            current = Self::strip(next);
                            continue;
                        },
                        None => Resolved::Uri(uri.clone()),
                    },
                    None => Resolved::Unknown,
                };
            }
            if let Some(id) = self.internal.get(&current) {
                return Resolved::Internal(id.clone());
            }
            return Resolved::Unknown;
        }
        Resolved::Unknown
    }

    /// Checks if a target uri is itself a reference (`other_`) and extracts
    /// the referenced name
    fn indirect(uri: &str) -> Option<&str> {
        if uri.contains(':') {
            return None;
        }
        let name = uri.strip_suffix('_')?;
        let name = name.strip_prefix('`').map_or(name, |n| n.strip_suffix('`').unwrap_or(n));
        (!name.is_empty() && !name.ends_with('\\')).then_some(name)
    }

    fn unique_id(&mut self, base: String) -> String {
        let count = self.used_ids.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 || base.is_empty() {
            base
        } else {
            format!("{}-{}", base, *count - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip() {
        assert_eq!(Targets::strip("    before").as_str(), "before");
        assert_eq!(Targets::strip("after      ").as_str(), "after");
        assert_eq!(Targets::strip(" \n both \n ").as_str(), "both");
        assert_eq!(Targets::strip("  internal   \n   spaces ").as_str(), "internal spaces");
        assert_eq!(Targets::strip("MiXeD Case").as_str(), "mixed case");
    }

    #[test]
    fn test_make_id() {
        assert_eq!(Targets::make_id("Simple Title").as_str(), "simple-title");
        assert_eq!(Targets::make_id("  Extra -- punctuation!  ").as_str(), "extra-punctuation");
        assert_eq!(Targets::make_id("...").as_str(), "");
    }

    #[test]
    fn test_resolution() {
        let mut targets = Targets::new();
        targets.add_external("Docs", "https://example.org");
        assert_eq!(targets.resolve("docs"), Resolved::Uri("https://example.org".into()));
        assert_eq!(targets.resolve("missing"), Resolved::Unknown);
        let id = targets.add_internal("Some Section");
        assert_eq!(id.as_str(), "some-section");
        assert_eq!(targets.resolve("some section"), Resolved::Internal("some-section".into()));
    }

    #[test]
    fn test_duplicates() {
        let mut targets = Targets::new();
        targets.add_external("name", "https://one.example");
        targets.add_external("name", "https://two.example");
        assert_eq!(targets.resolve("name"), Resolved::Unknown);
        let first = targets.add_internal("Title");
        let second = targets.add_internal("Title");
        assert_eq!(first.as_str(), "title");
        assert_eq!(second.as_str(), "title-1");
        assert_eq!(targets.resolve("title"), Resolved::Internal("title".into()));
    }

    #[test]
    fn test_indirect() {
        let mut targets = Targets::new();
        targets.add_external("one", "two_");
        targets.add_external("two", "`the end`_");
        targets.add_external("the end", "https://example.org");
        assert_eq!(targets.resolve("one"), Resolved::Uri("https://example.org".into()));
        let mut cycle = Targets::new();
        cycle.add_external("a", "b_");
        cycle.add_external("b", "a_");
        assert_eq!(cycle.resolve("a"), Resolved::Unknown);
    }
}
