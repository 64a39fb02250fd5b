//! Context tags.
//!
//! Tags are normalised on insertion and kept in a sorted set, so iteration
//! order never depends on how the caller stored them.
//!
//! # Normalisation
//! - trim, lowercase, inner whitespace becomes `.`
//! - module qualifiers after `:` are dropped (`terraform.module:vpc` → `terraform.module`)
//! - environment synonyms collapse to `prod`, `staging`, `dev`

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A deduplicated, sorted set of normalised tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tag after normalisation. Returns `false` if the tag was
    /// empty after normalisation or already present.
    pub fn insert(&mut self, tag: &str) -> bool {
        match normalize_tag(tag) {
            Some(t) => self.tags.insert(t),
            None => false,
        }
    }

    /// Whether the (normalised) tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|t| self.tags.contains(&t))
    }

    /// Iterates tags in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Tags present in both sets, in lexicographic order.
    pub fn intersection<'a>(&'a self, other: &'a TagSet) -> impl Iterator<Item = &'a str> {
        self.tags.intersection(&other.tags).map(String::as_str)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Lexicographically first tag.
    pub fn first(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.tags.into_iter().collect()
    }
}

/// Normalises a raw tag. Returns `None` for blank input.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let lowered = raw
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
        .to_lowercase();
    let base = lowered.split(':').next().unwrap_or_default();
    if base.is_empty() {
        return None;
    }
    let canonical = match base {
        "prod" | "production" => "prod",
        "staging" | "stage" | "preprod" => "staging",
        "dev" | "development" => "dev",
        other => other,
    };
    Some(canonical.to_string())
}

/// Segment of a tag before the first `.` (`aws.lambda` → `aws`).
pub fn top_level(tag: &str) -> &str {
    tag.split('.').next().unwrap_or(tag)
}
