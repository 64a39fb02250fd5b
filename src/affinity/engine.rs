//! Seed-and-absorb clustering over the similarity graph.
//!
//! # Algorithm
//!
//! 1. Weight tags by specificity and build the pairwise similarity matrix.
//! 2. Among unclustered items, pick the seed with the largest summed
//!    similarity to other unclustered items at or above the threshold
//!    (ties: earliest input position).
//! 3. Absorb every unclustered item whose similarity to the seed meets the
//!    threshold. Members keep input order.
//! 4. Repeat until every item is placed.
//!
//! # Complexity
//! O(n²·t) to build the matrix (t = tags per item), O(n³) worst case for
//! seed selection.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use super::similarity::{SimilarityMatrix, TagWeights};
use crate::config::{AffinityConfig, SingletonPolicy};
use crate::error::Result;
use crate::models::{AffinityGroup, WorkItem, NO_SHARED_CONTEXT};
use crate::validation::validate_items;

/// Key used for groups whose members carry no tags.
pub const MISC_KEY: &str = "misc";

/// Groups work items that share technical context.
///
/// # Example
///
/// ```
/// use u_workplan::affinity::AffinityEngine;
/// use u_workplan::models::WorkItem;
///
/// let items = vec![
///     WorkItem::new("A").with_tags(["aws.lambda", "terraform"]).with_effort(2.0),
///     WorkItem::new("B").with_tags(["aws.lambda", "iam"]).with_effort(1.0),
/// ];
/// let groups = AffinityEngine::new().compute(&items).unwrap();
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].key, "aws.lambda");
/// assert_eq!(groups[0].members, vec!["A", "B"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AffinityEngine {
    config: AffinityConfig,
}

impl AffinityEngine {
    /// Creates an engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: AffinityConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &AffinityConfig {
        &self.config
    }

    /// Computes affinity groups for an eligible item snapshot.
    ///
    /// Empty input yields an empty result. Fails with `InvalidInput` on
    /// negative or non-finite effort and on blank or duplicate ids, and
    /// with `InvalidConstraint` on a malformed configuration.
    pub fn compute(&self, items: &[WorkItem]) -> Result<Vec<AffinityGroup>> {
        self.config.validate()?;
        if items.is_empty() {
            return Ok(Vec::new());
        }
        validate_items(items)?;

        let weights = TagWeights::from_items(items);
        let matrix = SimilarityMatrix::build(items, &weights);
        let threshold = self.config.similarity_threshold;

        let mut placed = vec![false; items.len()];
        let mut taken_keys: HashSet<String> = HashSet::new();
        let mut groups = Vec::new();

        while let Some(seed) = select_seed(&matrix, &placed, threshold) {
            let members: Vec<usize> = (0..items.len())
                .filter(|&j| !placed[j] && (j == seed || matrix.get(seed, j) >= threshold))
                .collect();
            for &m in &members {
                placed[m] = true;
            }

            let overlap = if members.len() == 1 {
                overlapping_tags(seed, items)
            } else {
                Vec::new()
            };
            if members.len() == 1
                && overlap.is_empty()
                && self.config.singleton_policy == SingletonPolicy::Ungrouped
            {
                debug!(item = %items[seed].id, "leaving item without overlap ungrouped");
                continue;
            }

            let shared = key_tags(&members, items, self.config.max_key_tags);
            let base_key = if shared.is_empty() {
                MISC_KEY.to_string()
            } else {
                shared.join("+")
            };
            let key = unique_key(base_key, &mut taken_keys);

            let rationale = if members.len() > 1 {
                format!("shared context: {} ({} items)", shared.join(", "), members.len())
            } else if overlap.is_empty() {
                NO_SHARED_CONTEXT.to_string()
            } else {
                format!("overlap below threshold: {}", overlap.join(", "))
            };

            debug!(
                key = %key,
                seed = %items[seed].id,
                members = members.len(),
                "formed affinity group"
            );

            groups.push(AffinityGroup {
                key,
                rationale,
                members: members.iter().map(|&m| items[m].id.clone()).collect(),
                shared_tags: shared,
            });
        }

        info!(
            items = items.len(),
            groups = groups.len(),
            "affinity grouping complete"
        );
        Ok(groups)
    }
}

/// Picks the unplaced item with the strongest above-threshold connections.
fn select_seed(matrix: &SimilarityMatrix, placed: &[bool], threshold: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in (0..placed.len()).filter(|&i| !placed[i]) {
        let strength: f64 = (0..placed.len())
            .filter(|&j| j != i && !placed[j])
            .map(|j| matrix.get(i, j))
            .filter(|&s| s >= threshold)
            .sum();
        match best {
            Some((_, best_strength)) if strength <= best_strength => {}
            _ => best = Some((i, strength)),
        }
    }
    best.map(|(i, _)| i)
}

/// Most frequent tags among the members, lexicographically ordered.
///
/// Multi-member groups only consider tags carried by at least two members.
fn key_tags(members: &[usize], items: &[WorkItem], max_tags: usize) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &m in members {
        for tag in items[m].tags.iter() {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    let min_count = if members.len() > 1 { 2 } else { 1 };

    let mut ranked: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|&(_, c)| c >= min_count)
        .collect();
    // Stable sort keeps lexicographic order within equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut chosen: Vec<String> = ranked
        .into_iter()
        .take(max_tags)
        .map(|(t, _)| t.to_string())
        .collect();
    chosen.sort();
    chosen
}

/// Tags of `seed` that some other item also carries.
fn overlapping_tags(seed: usize, items: &[WorkItem]) -> Vec<String> {
    items[seed]
        .tags
        .iter()
        .filter(|tag| {
            items
                .iter()
                .enumerate()
                .any(|(j, other)| j != seed && other.tags.contains(tag))
        })
        .map(str::to_string)
        .collect()
}

/// First of `base`, `base#2`, `base#3`... not yet emitted in this pass.
fn unique_key(base: String, taken: &mut HashSet<String>) -> String {
    let mut key = base.clone();
    let mut n = 1;
    while taken.contains(&key) {
        n += 1;
        key = format!("{base}#{n}");
    }
    taken.insert(key.clone());
    key
}
