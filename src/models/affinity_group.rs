//! Affinity group model.
//!
//! A group is a transient batch of work items sharing technical context.
//! Groups are recomputed from scratch on every pass; the key makes
//! re-computation idempotent and lets callers de-duplicate stored sets.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rationale attached to groups whose single member overlaps with nothing.
pub const NO_SHARED_CONTEXT: &str = "no shared context";

/// A cluster of work items intended to be worked on together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityGroup {
    /// Deterministic key derived from the dominant shared tags.
    pub key: String,
    /// Short explanation of why the members belong together.
    pub rationale: String,
    /// Member item ids in input order.
    pub members: Vec<String>,
    /// Tags named by the key.
    #[serde(default)]
    pub shared_tags: Vec<String>,
}

impl AffinityGroup {
    /// Creates an empty group with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rationale: String::new(),
            members: Vec::new(),
            shared_tags: Vec::new(),
        }
    }

    /// Sets the rationale.
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Adds a member id.
    pub fn with_member(mut self, item_id: impl Into<String>) -> Self {
        self.members.push(item_id.into());
        self
    }

    /// Sets the shared tags.
    pub fn with_shared_tags(mut self, tags: Vec<String>) -> Self {
        self.shared_tags = tags;
        self
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the group holds exactly one item.
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// Whether the item is a member.
    pub fn contains(&self, item_id: &str) -> bool {
        self.members.iter().any(|m| m == item_id)
    }
}

/// Combines previously stored groups with a freshly computed set.
///
/// With `clear_existing` the fresh set replaces everything. Otherwise
/// fresh groups replace stored groups with the same key, remaining stored
/// groups lose members claimed by a fresh group, and stored groups left
/// empty are dropped. Fresh groups come first, in their computed order.
pub fn merge_groups(
    existing: &[AffinityGroup],
    fresh: &[AffinityGroup],
    clear_existing: bool,
) -> Vec<AffinityGroup> {
    if clear_existing {
        return fresh.to_vec();
    }

    let fresh_keys: HashSet<&str> = fresh.iter().map(|g| g.key.as_str()).collect();
    let claimed: HashSet<&str> = fresh
        .iter()
        .flat_map(|g| g.members.iter().map(String::as_str))
        .collect();

    let mut merged = fresh.to_vec();
    for old in existing {
        if fresh_keys.contains(old.key.as_str()) {
            continue;
        }
        let mut kept = old.clone();
        kept.members.retain(|m| !claimed.contains(m.as_str()));
        if !kept.is_empty() {
            merged.push(kept);
        }
    }
    merged
}
