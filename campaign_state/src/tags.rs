//! Tag collections - free-text labels used for relevance matching.

use serde::{Deserialize, Serialize};

/// Stock campaign-level tags offered to a new campaign's editor.
pub const DEFAULT_TAG_PALETTE: [&str; 21] = [
    "forêt",
    "ville",
    "donjon",
    "montagne",
    "mer",
    "desert",
    "combat",
    "enigme",
    "social",
    "exploration",
    "commerce",
    "magie",
    "religion",
    "politique",
    "familial",
    "sombre",
    "tragédie",
    "victoire",
    "trahison",
    "alliance",
    "révélation",
];

/// Trim a raw tag, rejecting it if nothing is left.
pub fn clean_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// An insertion-ordered set of tags.
///
/// Every stored tag is trimmed and non-empty, and no tag appears twice.
/// Deserialization goes through the same cleaning, so records written by
/// other tools are normalised on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock palette, see [`DEFAULT_TAG_PALETTE`].
    pub fn default_palette() -> Self {
        DEFAULT_TAG_PALETTE.into_iter().collect()
    }

    /// Parse a comma-separated list such as `"sombre, danger,,forêt"`.
    pub fn parse_list(list: &str) -> Self {
        list.split(',').collect()
    }

    /// Insert a tag. Returns `false` if it was blank or already present.
    pub fn insert(&mut self, raw: &str) -> bool {
        match clean_tag(raw) {
            Some(tag) if !self.tags.contains(&tag) => {
                self.tags.push(tag);
                true
            }
            _ => false,
        }
    }

    /// Remove a tag. Returns `false` if it was not present.
    pub fn remove(&mut self, raw: &str) -> bool {
        let Some(tag) = clean_tag(raw) else {
            return false;
        };
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        self.tags.len() != before
    }

    /// Insert every tag from `other`. Returns the number actually added.
    pub fn extend_from(&mut self, other: &TagSet) -> usize {
        other.iter().filter(|t| self.insert(t)).count()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for raw in iter {
            set.insert(raw.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(raw: Vec<String>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut tags = TagSet::new();
        assert!(tags.insert("danger"));
        assert!(!tags.insert("danger"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_insert_trims_and_rejects_blank() {
        let mut tags = TagSet::new();
        assert!(tags.insert("  forêt "));
        assert!(!tags.insert("forêt"));
        assert!(!tags.insert("   "));
        assert_eq!(tags.as_slice(), &["forêt".to_string()]);
    }

    #[test]
    fn test_parse_list() {
        let tags = TagSet::parse_list("sombre, danger,, sombre ,");
        assert_eq!(tags.as_slice(), &["sombre".to_string(), "danger".to_string()]);
    }

    #[test]
    fn test_remove() {
        let mut tags = TagSet::parse_list("a,b");
        assert!(tags.remove("a"));
        assert!(!tags.remove("a"));
        assert!(tags.contains("b"));
    }

    #[test]
    fn test_default_palette() {
        let palette = TagSet::default_palette();
        assert_eq!(palette.len(), DEFAULT_TAG_PALETTE.len());
        assert_eq!(palette.as_slice()[0], "forêt");
        assert!(palette.contains("révélation"));
    }

    #[test]
    fn test_deserialize_cleans() {
        let tags: TagSet = serde_json::from_str(r#"[" a", "a", "", "b"]"#).unwrap();
        assert_eq!(tags.as_slice(), &["a".to_string(), "b".to_string()]);
    }
}
