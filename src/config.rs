//! Configuration records for grouping and scheduling.
//!
//! Every tunable is a named field with a documented default. Both records
//! deserialise with missing fields filled from [`Default`], so callers can
//! keep partial JSON/YAML documents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{PlanError, Result};
use crate::models::{HorizonUnit, PlanBucket, Reservation, WorkCalendar, STANDARD_WORKWEEK};
use crate::scheduler::PriorityRule;

/// Day-level constraints for a scheduling run.
///
/// | Field | Default |
/// |-------|---------|
/// | `max_contexts_per_day` | 2 |
/// | `max_focus_blocks_per_day` | 4 |
/// | `buffer_ratio` | 0.2 |
/// | `workdays` | Mon–Fri (`0..=4`) |
/// | `daily_capacity` | 8.0 |
/// | `horizon_unit` | calendar days |
/// | `priority` | largest effort first |
/// | `buffer_block` | off |
/// | `reservations` | none |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConstraints {
    /// Distinct contexts allowed on one day.
    pub max_contexts_per_day: u32,
    /// Focus blocks allowed on one day.
    pub max_focus_blocks_per_day: u32,
    /// Fraction of daily capacity held back, in `[0, 1)`.
    pub buffer_ratio: f64,
    /// Weekday indices eligible for scheduling (Monday = 0).
    pub workdays: BTreeSet<u8>,
    /// Nominal capacity of a workday, in effort units.
    pub daily_capacity: f64,
    /// How `horizon_days` is counted.
    pub horizon_unit: HorizonUnit,
    /// Ordering rules for the work queue, applied in sequence.
    pub priority: Vec<PriorityRule>,
    /// Emit an Admin "Buffer/Slack" block on every workday that gets work.
    pub buffer_block: bool,
    /// Pre-declared Admin/Meeting capacity.
    pub reservations: Vec<Reservation>,
}

impl Default for PlanConstraints {
    fn default() -> Self {
        Self {
            max_contexts_per_day: 2,
            max_focus_blocks_per_day: 4,
            buffer_ratio: 0.2,
            workdays: STANDARD_WORKWEEK.into_iter().collect(),
            daily_capacity: 8.0,
            horizon_unit: HorizonUnit::CalendarDays,
            priority: vec![PriorityRule::LargestEffort],
            buffer_block: false,
            reservations: Vec::new(),
        }
    }
}

impl PlanConstraints {
    /// Creates the default constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the distinct-context limit.
    pub fn with_max_contexts_per_day(mut self, n: u32) -> Self {
        self.max_contexts_per_day = n;
        self
    }

    /// Sets the Focus block limit.
    pub fn with_max_focus_blocks_per_day(mut self, n: u32) -> Self {
        self.max_focus_blocks_per_day = n;
        self
    }

    /// Sets the buffer ratio.
    pub fn with_buffer_ratio(mut self, ratio: f64) -> Self {
        self.buffer_ratio = ratio;
        self
    }

    /// Replaces the workday set.
    pub fn with_workdays(mut self, workdays: impl IntoIterator<Item = u8>) -> Self {
        self.workdays = workdays.into_iter().collect();
        self
    }

    /// Sets the nominal daily capacity.
    pub fn with_daily_capacity(mut self, capacity: f64) -> Self {
        self.daily_capacity = capacity;
        self
    }

    /// Sets how the horizon is counted.
    pub fn with_horizon_unit(mut self, unit: HorizonUnit) -> Self {
        self.horizon_unit = unit;
        self
    }

    /// Replaces the ordering rules.
    pub fn with_priority(mut self, rules: Vec<PriorityRule>) -> Self {
        self.priority = rules;
        self
    }

    /// Enables the per-day buffer block.
    pub fn with_buffer_block(mut self, enabled: bool) -> Self {
        self.buffer_block = enabled;
        self
    }

    /// Adds a reservation.
    pub fn with_reservation(mut self, reservation: Reservation) -> Self {
        self.reservations.push(reservation);
        self
    }

    /// Checks every field.
    pub fn validate(&self) -> Result<()> {
        if self.max_contexts_per_day == 0 {
            return Err(invalid("max_contexts_per_day must be positive"));
        }
        if self.max_focus_blocks_per_day == 0 {
            return Err(invalid("max_focus_blocks_per_day must be positive"));
        }
        if !(self.buffer_ratio.is_finite() && (0.0..1.0).contains(&self.buffer_ratio)) {
            return Err(invalid(format!(
                "buffer_ratio must be in [0, 1), got {}",
                self.buffer_ratio
            )));
        }
        if !(self.daily_capacity.is_finite() && self.daily_capacity > 0.0) {
            return Err(invalid(format!(
                "daily_capacity must be positive, got {}",
                self.daily_capacity
            )));
        }
        if self.workdays.is_empty() {
            return Err(invalid("workdays must not be empty"));
        }
        if let Some(bad) = self.workdays.iter().find(|&&d| d > 6) {
            return Err(invalid(format!("workday index {bad} is outside 0..=6")));
        }
        for r in &self.reservations {
            if r.bucket == PlanBucket::Focus {
                return Err(invalid(format!("reservation on {} uses the Focus bucket", r.date)));
            }
            if !(r.hours.is_finite() && r.hours >= 0.0) {
                return Err(invalid(format!(
                    "reservation on {} has invalid hours {}",
                    r.date, r.hours
                )));
            }
        }
        Ok(())
    }

    /// Builds the capacity calendar these constraints describe.
    pub fn calendar(&self) -> WorkCalendar {
        WorkCalendar {
            workdays: self.workdays.clone(),
            daily_capacity: self.daily_capacity,
            buffer_ratio: self.buffer_ratio,
            reservations: self.reservations.clone(),
        }
    }
}

/// What to do with an item that overlaps with no other item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingletonPolicy {
    /// Emit a one-member group.
    #[default]
    Singleton,
    /// Leave the item out of the result.
    Ungrouped,
}

/// Tunables for affinity grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffinityConfig {
    /// Minimum similarity for absorbing an item into a seed's group, in `(0, 1]`.
    pub similarity_threshold: f64,
    /// Treatment of items without overlap.
    pub singleton_policy: SingletonPolicy,
    /// Maximum tags concatenated into a group key.
    pub max_key_tags: usize,
}

impl Default for AffinityConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.25,
            singleton_policy: SingletonPolicy::Singleton,
            max_key_tags: 3,
        }
    }
}

impl AffinityConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Sets the singleton policy.
    pub fn with_singleton_policy(mut self, policy: SingletonPolicy) -> Self {
        self.singleton_policy = policy;
        self
    }

    /// Sets the key tag limit.
    pub fn with_max_key_tags(mut self, n: usize) -> Self {
        self.max_key_tags = n;
        self
    }

    /// Checks every field.
    pub fn validate(&self) -> Result<()> {
        let t = self.similarity_threshold;
        if !(t.is_finite() && t > 0.0 && t <= 1.0) {
            return Err(invalid(format!("similarity_threshold must be in (0, 1], got {t}")));
        }
        if self.max_key_tags == 0 {
            return Err(invalid("max_key_tags must be positive"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> PlanError {
    PlanError::InvalidConstraint(message.into())
}
