//! Work item model.
//!
//! A work item is the atomic unit both grouping and scheduling operate on:
//! a decomposed task with context tags and an effort estimate. The engine
//! only ever reads snapshots of these records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TagSet;

/// Lifecycle status of a work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    /// Not started.
    #[default]
    Pending,
    /// In progress.
    Active,
    /// Waiting on something external.
    Blocked,
    /// Done.
    Complete,
}

impl WorkStatus {
    /// Whether items in this status may be grouped and scheduled.
    pub fn is_eligible(self) -> bool {
        matches!(self, WorkStatus::Pending | WorkStatus::Active)
    }
}

/// An atomic unit of schedulable work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique, stable identifier.
    pub id: String,
    /// Free-text label. Never interpreted.
    #[serde(default)]
    pub label: String,
    /// Context tags (domain / technology markers).
    #[serde(default)]
    pub tags: TagSet,
    /// Estimated effort (hours or points). Must be finite and non-negative.
    #[serde(default)]
    pub effort: f64,
    /// Lifecycle status.
    #[serde(default)]
    pub status: WorkStatus,
    /// Due date of the parent ticket, if any.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Parent ticket identifier, if any.
    #[serde(default)]
    pub ticket_id: Option<String>,
}

impl WorkItem {
    /// Creates a pending, untagged, zero-effort item.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            tags: TagSet::new(),
            effort: 0.0,
            status: WorkStatus::Pending,
            due_date: None,
            ticket_id: None,
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Adds several tags.
    pub fn with_tags<S: AsRef<str>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        for tag in tags {
            self.tags.insert(tag.as_ref());
        }
        self
    }

    /// Sets the effort estimate.
    pub fn with_effort(mut self, effort: f64) -> Self {
        self.effort = effort;
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: WorkStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Sets the parent ticket.
    pub fn with_ticket(mut self, ticket_id: impl Into<String>) -> Self {
        self.ticket_id = Some(ticket_id.into());
        self
    }

    /// Whether the effort value is usable (finite, >= 0).
    #[inline]
    pub fn has_valid_effort(&self) -> bool {
        self.effort.is_finite() && self.effort >= 0.0
    }

    /// Whether this item may be grouped and scheduled.
    pub fn is_eligible(&self) -> bool {
        self.status.is_eligible()
    }
}

/// Keeps only items in an eligible status, preserving order.
pub fn eligible(items: &[WorkItem]) -> Vec<WorkItem> {
    items.iter().filter(|i| i.is_eligible()).cloned().collect()
}
