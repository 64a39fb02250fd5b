//! Tag-specificity weighting and pairwise item similarity.
//!
//! # Weighting
//! For `n` items and a tag carried by `df` of them:
//!
//! ```text
//! w(t) = 1 + ln(n / df)
//! ```
//!
//! A tag on every item weighs 1; rarer tags weigh more.
//!
//! # Similarity
//! Weighted overlap coefficient:
//!
//! ```text
//! sim(a, b) = Σ w(t) for t ∈ a ∩ b  /  min(W(a), W(b))
//! ```
//!
//! where `W(x)` sums the weights of x's tags. Range `[0, 1]`; 0 when either
//! side is untagged.

use std::collections::BTreeMap;

use crate::models::{TagSet, WorkItem};

/// Per-tag specificity weights for one item pool.
#[derive(Debug, Clone, Default)]
pub struct TagWeights {
    weights: BTreeMap<String, f64>,
}

impl TagWeights {
    /// Computes weights from document frequencies across `items`.
    pub fn from_items(items: &[WorkItem]) -> Self {
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for item in items {
            for tag in item.tags.iter() {
                *df.entry(tag).or_insert(0) += 1;
            }
        }

        let n = items.len() as f64;
        let weights = df
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), 1.0 + (n / count as f64).ln()))
            .collect();
        Self { weights }
    }

    /// Weight of a tag. Tags outside the pool weigh 1.
    pub fn weight(&self, tag: &str) -> f64 {
        self.weights.get(tag).copied().unwrap_or(1.0)
    }

    /// Sum of weights over a tag set.
    pub fn total(&self, tags: &TagSet) -> f64 {
        tags.iter().map(|t| self.weight(t)).sum()
    }

    /// Weighted overlap coefficient of two tag sets.
    pub fn similarity(&self, a: &TagSet, b: &TagSet) -> f64 {
        let denom = self.total(a).min(self.total(b));
        if denom <= 0.0 {
            return 0.0;
        }
        let shared: f64 = a.intersection(b).map(|t| self.weight(t)).sum();
        shared / denom
    }
}

/// Symmetric pairwise similarity over an item pool.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Builds the matrix. The diagonal is zero.
    pub fn build(items: &[WorkItem], weights: &TagWeights) -> Self {
        let n = items.len();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let s = weights.similarity(&items[i].tags, &items[j].tags);
                values[i * n + j] = s;
                values[j * n + i] = s;
            }
        }
        Self { n, values }
    }

    /// Similarity between items `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> TagSet {
        list.iter().collect()
    }

    #[test]
    fn test_weights_prefer_rare_tags() {
        let items = vec![
            WorkItem::new("1").with_tags(["prod", "aws.lambda"]),
            WorkItem::new("2").with_tags(["prod", "aws.lambda"]),
            WorkItem::new("3").with_tags(["prod", "iam"]),
            WorkItem::new("4").with_tags(["prod"]),
        ];
        let w = TagWeights::from_items(&items);
        // Universal tag → 1 + ln(1)
        assert!((w.weight("prod") - 1.0).abs() < 1e-10);
        assert!((w.weight("aws.lambda") - (1.0 + 2f64.ln())).abs() < 1e-10);
        assert!((w.weight("iam") - (1.0 + 4f64.ln())).abs() < 1e-10);
        assert!(w.weight("iam") > w.weight("aws.lambda"));
        assert!(w.weight("aws.lambda") > w.weight("prod"));
    }

    #[test]
    fn test_shared_context_similarity() {
        // A {aws.lambda, terraform}, B {aws.lambda, iam}
        let items = vec![
            WorkItem::new("A").with_tags(["aws.lambda", "terraform"]),
            WorkItem::new("B").with_tags(["aws.lambda", "iam"]),
        ];
        let w = TagWeights::from_items(&items);
        let s = w.similarity(&items[0].tags, &items[1].tags);
        // 1 / (1 + 1 + ln 2)
        let expected = 1.0 / (2.0 + 2f64.ln());
        assert!((s - expected).abs() < 1e-10);
        assert!(s > 0.25);
    }

    #[test]
    fn test_identical_and_disjoint() {
        let w = TagWeights::default();
        assert!((w.similarity(&tags(&["a", "b"]), &tags(&["a", "b"])) - 1.0).abs() < 1e-10);
        assert_eq!(w.similarity(&tags(&["a"]), &tags(&["b"])), 0.0);
        assert_eq!(w.similarity(&tags(&[]), &tags(&["b"])), 0.0);
    }

    #[test]
    fn test_subset_is_fully_similar() {
        let w = TagWeights::default();
        let s = w.similarity(&tags(&["k8s"]), &tags(&["k8s", "helm", "prod"]));
        assert!((s - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_matrix_symmetric() {
        let items = vec![
            WorkItem::new("1").with_tags(["a", "b"]),
            WorkItem::new("2").with_tags(["b", "c"]),
            WorkItem::new("3").with_tags(["d"]),
        ];
        let w = TagWeights::from_items(&items);
        let m = SimilarityMatrix::build(&items, &w);
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), m.get(1, 0));
        assert!(m.get(0, 1) > 0.0);
        assert_eq!(m.get(0, 2), 0.0);
    }
}
