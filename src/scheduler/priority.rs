//! Work queue ordering rules.
//!
//! Rules are applied in sequence; a later rule only decides ties left by
//! the earlier ones. Remaining ties fall back to input order, so the queue
//! order is always total and reproducible.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::queue::WorkUnit;

/// A queue ordering rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityRule {
    /// Largest total effort first (LPT).
    LargestEffort,
    /// Earliest due date first (EDD). Units without a due date go last.
    EarliestDue,
    /// Input order (groups, then loose items).
    InputOrder,
}

impl PriorityRule {
    /// Rule name.
    pub fn name(&self) -> &'static str {
        match self {
            PriorityRule::LargestEffort => "LPT",
            PriorityRule::EarliestDue => "EDD",
            PriorityRule::InputOrder => "FIFO",
        }
    }

    /// Compares two units; `Less` means `a` is scheduled first.
    pub(crate) fn compare(&self, a: &WorkUnit, b: &WorkUnit) -> Ordering {
        match self {
            PriorityRule::LargestEffort => b.rank_effort.total_cmp(&a.rank_effort),
            PriorityRule::EarliestDue => match (a.due, b.due) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            PriorityRule::InputOrder => a.order.cmp(&b.order),
        }
    }
}

/// Sorts units by the rule chain, then input order, then chunk index.
pub(crate) fn sort_units(units: &mut [WorkUnit], rules: &[PriorityRule]) {
    units.sort_by(|a, b| {
        rules
            .iter()
            .map(|r| r.compare(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
            .then(a.order.cmp(&b.order))
            .then(a.chunk.cmp(&b.chunk))
    });
}
