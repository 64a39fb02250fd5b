//! Affinity grouping.
//!
//! Clusters work items that share technical context so they can be batched
//! onto the same day. Tags are weighted by specificity (rarer tags signal a
//! stronger bond), items are linked by weighted tag overlap, and groups grow
//! greedily around the best-connected remaining item.
//!
//! The pass is pure and deterministic: identical input in identical order
//! yields identical groups, keys and member order.

mod engine;
mod similarity;

pub use engine::{AffinityEngine, MISC_KEY};
pub use similarity::{SimilarityMatrix, TagWeights};
