//! Plan quality metrics (KPIs).
//!
//! Summarizes a finished plan against the calendar it was built on.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Completion Rate | Scheduled items / all items |
//! | Days Used | Dates holding at least one Focus block |
//! | Utilization | Focus effort / available item capacity, per day |
//! | Max Contexts | Largest number of distinct contexts on one day |
//! | Switches Avoided | Items batched behind another item of the same block |

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::{Plan, WorkCalendar};

/// Plan performance indicators.
#[derive(Debug, Clone)]
pub struct PlanKpi {
    /// Items placed in Focus blocks.
    pub scheduled_items: usize,
    /// Items left over at the end of the horizon.
    pub unscheduled_items: usize,
    /// Fraction of items scheduled (0.0..1.0).
    pub completion_rate: f64,
    /// Number of Focus blocks.
    pub focus_blocks: usize,
    /// Dates with Focus work.
    pub days_used: usize,
    /// Focus effort per date.
    pub effort_by_day: BTreeMap<NaiveDate, f64>,
    /// Focus effort over the date's available capacity.
    pub utilization_by_day: BTreeMap<NaiveDate, f64>,
    /// Mean utilization over days used.
    pub avg_utilization: f64,
    /// Most distinct contexts on a single day.
    pub max_contexts_per_day: usize,
    /// Context switches saved by batching: scheduled items minus Focus blocks.
    pub switches_avoided: usize,
}

impl PlanKpi {
    /// Computes KPIs from a plan and its calendar.
    pub fn calculate(plan: &Plan, calendar: &WorkCalendar) -> Self {
        let focus: Vec<_> = plan.blocks.iter().filter(|b| b.is_focus()).collect();
        let scheduled_items: usize = focus.iter().map(|b| b.items.len()).sum();
        let unscheduled_items = plan.unscheduled.len();

        let mut effort_by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for block in &focus {
            *effort_by_day.entry(block.date).or_insert(0.0) += block.effort;
        }

        let utilization_by_day: BTreeMap<NaiveDate, f64> = effort_by_day
            .iter()
            .map(|(&date, &effort)| {
                let available = calendar.available_capacity(date);
                let u = if available > 0.0 { effort / available } else { 0.0 };
                (date, u)
            })
            .collect();

        let avg_utilization = if utilization_by_day.is_empty() {
            0.0
        } else {
            utilization_by_day.values().sum::<f64>() / utilization_by_day.len() as f64
        };

        let max_contexts_per_day = effort_by_day
            .keys()
            .map(|&d| plan.contexts_on(d).len())
            .max()
            .unwrap_or(0);

        let total = scheduled_items + unscheduled_items;
        let completion_rate = if total == 0 {
            1.0
        } else {
            scheduled_items as f64 / total as f64
        };

        Self {
            scheduled_items,
            unscheduled_items,
            completion_rate,
            focus_blocks: focus.len(),
            days_used: effort_by_day.len(),
            effort_by_day,
            utilization_by_day,
            avg_utilization,
            max_contexts_per_day,
            switches_avoided: scheduled_items.saturating_sub(focus.len()),
        }
    }

    /// Whether the plan meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_completion: f64, min_utilization: f64) -> bool {
        self.completion_rate >= min_completion && self.avg_utilization >= min_utilization
    }
}
