//! Plan (solution) model.
//!
//! A plan is the output of one scheduling run: dated, bucketed blocks plus
//! the items that did not fit in the horizon.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Work-type classification of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanBucket {
    /// Carries item work.
    Focus,
    /// Administrative capacity reservation.
    Admin,
    /// Meeting capacity reservation.
    Meeting,
}

/// A calendar-dated, bucketed slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanBlock {
    /// Day the block is pinned to.
    pub date: NaiveDate,
    /// Work-type bucket.
    pub bucket: PlanBucket,
    /// Human-readable note. Not interpreted.
    pub note: Option<String>,
    /// Member item ids. Empty for non-Focus blocks.
    pub items: Vec<String>,
    /// Context the block's items share (Focus only).
    pub context: Option<String>,
    /// Capacity consumed: item effort for Focus, reserved hours otherwise.
    pub effort: f64,
}

impl PlanBlock {
    /// Creates a Focus block.
    pub fn focus(
        date: NaiveDate,
        context: impl Into<String>,
        items: Vec<String>,
        effort: f64,
    ) -> Self {
        Self {
            date,
            bucket: PlanBucket::Focus,
            note: None,
            items,
            context: Some(context.into()),
            effort,
        }
    }

    /// Creates an item-less reservation block.
    pub fn reservation(date: NaiveDate, bucket: PlanBucket, hours: f64) -> Self {
        Self {
            date,
            bucket,
            note: None,
            items: Vec::new(),
            context: None,
            effort: hours,
        }
    }

    /// Sets the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether this is a Focus block.
    #[inline]
    pub fn is_focus(&self) -> bool {
        self.bucket == PlanBucket::Focus
    }
}

/// Result of a scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Blocks ordered by date, then emission order within the day.
    pub blocks: Vec<PlanBlock>,
    /// Items left over when the horizon ran out, in priority order.
    pub unscheduled: Vec<String>,
}

impl Plan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block.
    pub fn add_block(&mut self, block: PlanBlock) {
        self.blocks.push(block);
    }

    /// Whether the plan has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks on a given date.
    pub fn blocks_on(&self, date: NaiveDate) -> Vec<&PlanBlock> {
        self.blocks.iter().filter(|b| b.date == date).collect()
    }

    /// Focus blocks on a given date.
    pub fn focus_blocks_on(&self, date: NaiveDate) -> Vec<&PlanBlock> {
        self.blocks
            .iter()
            .filter(|b| b.date == date && b.is_focus())
            .collect()
    }

    /// Item effort scheduled on a given date (Focus blocks only).
    pub fn effort_on(&self, date: NaiveDate) -> f64 {
        self.focus_blocks_on(date).iter().map(|b| b.effort).sum()
    }

    /// Distinct contexts represented on a given date.
    pub fn contexts_on(&self, date: NaiveDate) -> BTreeSet<&str> {
        self.focus_blocks_on(date)
            .iter()
            .filter_map(|b| b.context.as_deref())
            .collect()
    }

    /// Distinct dates that carry at least one block, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.blocks
            .iter()
            .map(|b| b.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Finds the block holding an item.
    pub fn block_for_item(&self, item_id: &str) -> Option<&PlanBlock> {
        self.blocks
            .iter()
            .find(|b| b.items.iter().any(|i| i == item_id))
    }

    /// All scheduled item ids in block order.
    pub fn scheduled_items(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .flat_map(|b| b.items.iter().map(String::as_str))
            .collect()
    }

    /// Combines previously stored blocks with this plan's blocks.
    ///
    /// With `clear_existing_from_start`, stored blocks dated on or after
    /// `start` are discarded first. Stored blocks precede new ones.
    pub fn merge_into(
        &self,
        existing: &[PlanBlock],
        start: NaiveDate,
        clear_existing_from_start: bool,
    ) -> Vec<PlanBlock> {
        existing
            .iter()
            .filter(|b| !clear_existing_from_start || b.date < start)
            .chain(self.blocks.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn sample_plan() -> Plan {
        let mut p = Plan::new();
        p.add_block(PlanBlock::focus(d(2), "aws.lambda", vec!["A".into(), "B".into()], 5.0));
        p.add_block(PlanBlock::focus(d(2), "iam", vec!["C".into()], 1.0));
        p.add_block(PlanBlock::reservation(d(2), PlanBucket::Meeting, 1.0).with_note("standup"));
        p.add_block(PlanBlock::focus(d(3), "aws.lambda", vec!["D".into()], 2.0));
        p
    }

    #[test]
    fn test_plan_queries() {
        let p = sample_plan();
        assert_eq!(p.block_count(), 4);
        assert_eq!(p.blocks_on(d(2)).len(), 3);
        assert_eq!(p.focus_blocks_on(d(2)).len(), 2);
        assert!((p.effort_on(d(2)) - 6.0).abs() < 1e-10);
        assert_eq!(p.contexts_on(d(2)).len(), 2);
        assert_eq!(p.dates(), vec![d(2), d(3)]);
        assert_eq!(p.scheduled_items(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_block_for_item() {
        let p = sample_plan();
        assert_eq!(p.block_for_item("C").unwrap().context.as_deref(), Some("iam"));
        assert_eq!(p.block_for_item("D").unwrap().date, d(3));
        assert!(p.block_for_item("Z").is_none());
    }

    #[test]
    fn test_reservation_block() {
        let b = PlanBlock::reservation(d(4), PlanBucket::Admin, 2.0).with_note("Buffer/Slack");
        assert!(!b.is_focus());
        assert!(b.items.is_empty());
        assert!(b.context.is_none());
        assert_eq!(b.note.as_deref(), Some("Buffer/Slack"));
    }

    #[test]
    fn test_merge_into_clear_from_start() {
        let existing = vec![
            PlanBlock::focus(d(1), "old", vec!["X".into()], 1.0),
            PlanBlock::focus(d(2), "old", vec!["Y".into()], 1.0),
        ];
        let p = sample_plan();

        let merged = p.merge_into(&existing, d(2), true);
        assert_eq!(merged.len(), 1 + p.block_count());
        assert_eq!(merged[0].items, vec!["X"]);

        let kept = p.merge_into(&existing, d(2), false);
        assert_eq!(kept.len(), 2 + p.block_count());
    }

    #[test]
    fn test_empty_plan() {
        let p = Plan::new();
        assert!(p.is_empty());
        assert!(p.dates().is_empty());
        assert_eq!(p.effort_on(d(1)), 0.0);
    }
}
