//! Capacity-aware greedy day planner.
//!
//! # Algorithm
//!
//! 1. Turn the pool into indivisible units (groups, group chunks, loose items).
//! 2. Sort units by the configured rule chain (default: largest effort first,
//!    ties by input order).
//! 3. Fold over the horizon's workdays. Each day opens a fresh [`DayLoad`]
//!    and admits, in queue order, every unit that fits the remaining
//!    capacity, the distinct-context limit and the Focus block limit.
//!    Units that do not fit are deferred whole to the next day.
//! 4. Whatever is still queued when the horizon ends is reported as
//!    unscheduled. Days are generated lazily and the walk stops early once
//!    no queued unit can fit any day and no reservation lies ahead.
//!
//! # Complexity
//! O(d · u) where d = workdays visited, u = units.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use super::priority::sort_units;
use super::queue::{build_units, WorkPool, WorkUnit, EPSILON};
use crate::config::PlanConstraints;
use crate::error::{PlanError, Result};
use crate::models::{HorizonUnit, Plan, PlanBlock, PlanBucket, WorkCalendar};

/// Note placed on the optional per-day buffer block.
pub const BUFFER_NOTE: &str = "Buffer/Slack";

/// Input container for a planning run.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// First candidate date.
    pub start: NaiveDate,
    /// Horizon length, counted per `constraints.horizon_unit`.
    pub horizon_days: u32,
    /// Day-level constraints.
    pub constraints: PlanConstraints,
    /// Whether stored blocks from `start` onward are discarded when the
    /// result is merged into an existing plan.
    pub clear_existing_from_start: bool,
}

impl PlanRequest {
    /// Creates a request with default constraints.
    pub fn new(start: NaiveDate, horizon_days: u32) -> Self {
        Self {
            start,
            horizon_days,
            constraints: PlanConstraints::default(),
            clear_existing_from_start: true,
        }
    }

    /// Ten working days from `start`.
    pub fn two_week(start: NaiveDate) -> Self {
        let mut request = Self::new(start, 10);
        request.constraints.horizon_unit = HorizonUnit::Workdays;
        request
    }

    /// Sets the constraints.
    pub fn with_constraints(mut self, constraints: PlanConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Sets the replacement flag.
    pub fn with_clear_existing(mut self, clear: bool) -> Self {
        self.clear_existing_from_start = clear;
        self
    }

    /// Blocks the caller should persist after this run.
    pub fn replace_existing(&self, plan: &Plan, existing: &[PlanBlock]) -> Vec<PlanBlock> {
        plan.merge_into(existing, self.start, self.clear_existing_from_start)
    }
}

/// Greedy day-filling planner.
///
/// Stateless; every run starts from a clean slate for its date range.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_workplan::config::PlanConstraints;
/// use u_workplan::models::WorkItem;
/// use u_workplan::scheduler::{PlanScheduler, WorkPool};
///
/// let items = vec![
///     WorkItem::new("S1").with_tag("terraform").with_effort(3.0),
///     WorkItem::new("S2").with_tag("iam").with_effort(2.0),
/// ];
/// let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
/// let plan = PlanScheduler::new()
///     .schedule(&WorkPool::items(&items), monday, 14, &PlanConstraints::default())
///     .unwrap();
/// assert_eq!(plan.focus_blocks_on(monday).len(), 2);
/// assert!(plan.unscheduled.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanScheduler;

impl PlanScheduler {
    /// Creates a scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Assigns the pool to dated Focus blocks.
    ///
    /// Fails with `InvalidConstraint` on malformed constraints or a zero
    /// horizon, and with `InvalidInput` on malformed items or groups. An
    /// empty pool yields an empty plan.
    pub fn schedule(
        &self,
        pool: &WorkPool<'_>,
        start: NaiveDate,
        horizon_days: u32,
        constraints: &PlanConstraints,
    ) -> Result<Plan> {
        constraints.validate()?;
        if horizon_days == 0 {
            return Err(PlanError::InvalidConstraint(
                "horizon_days must be positive".into(),
            ));
        }
        if pool.is_empty() {
            pool.validate()?;
            debug!("empty work pool, nothing to schedule");
            return Ok(Plan::new());
        }

        let calendar = constraints.calendar();
        let nominal = calendar.nominal_available();
        let mut queue = build_units(pool, nominal)?;
        sort_units(&mut queue, &constraints.priority);

        let limits = DayLimits {
            max_contexts: constraints.max_contexts_per_day as usize,
            max_focus_blocks: constraints.max_focus_blocks_per_day,
            buffer_block: constraints.buffer_block,
        };
        let last_reserved = calendar.reservations.iter().map(|r| r.date).max();

        let mut state = FoldState::new(queue);
        let mut last_day: Option<NaiveDate> = None;
        let mut workdays = 0usize;
        for day in calendar.horizon_days(start, horizon_days, constraints.horizon_unit) {
            // Nothing left that any fresh day could take, and no reservation
            // still ahead.
            let exhausted = state.pending.iter().all(|u| u.effort > nominal + EPSILON);
            if exhausted && last_reserved.map_or(true, |last| day > last) {
                break;
            }
            state = plan_day(state, day, &calendar, &limits);
            last_day = Some(day);
            workdays += 1;
        }
        log_ignored_reservations(&calendar, start, last_day);
        let plan = state.finish();

        if !plan.unscheduled.is_empty() {
            warn!(
                unscheduled = plan.unscheduled.len(),
                "horizon exhausted before the work pool"
            );
        }
        info!(
            %start,
            workdays,
            blocks = plan.block_count(),
            scheduled = plan.scheduled_items().len(),
            "plan built"
        );
        Ok(plan)
    }

    /// Schedules from a request.
    pub fn schedule_request(&self, pool: &WorkPool<'_>, request: &PlanRequest) -> Result<Plan> {
        self.schedule(pool, request.start, request.horizon_days, &request.constraints)
    }
}

#[derive(Debug, Clone, Copy)]
struct DayLimits {
    max_contexts: usize,
    max_focus_blocks: u32,
    buffer_block: bool,
}

/// Capacity state of one day, threaded through admissions.
#[derive(Debug, Clone)]
struct DayLoad {
    remaining: f64,
    contexts: BTreeSet<String>,
    focus_blocks: u32,
}

impl DayLoad {
    fn open(capacity: f64) -> Self {
        Self {
            remaining: capacity,
            contexts: BTreeSet::new(),
            focus_blocks: 0,
        }
    }

    /// The load after admitting `unit`, or `None` if it does not fit.
    fn admit(&self, unit: &WorkUnit, limits: &DayLimits) -> Option<DayLoad> {
        if self.focus_blocks >= limits.max_focus_blocks {
            return None;
        }
        if unit.effort > self.remaining + EPSILON {
            return None;
        }
        let known = self.contexts.contains(&unit.context);
        if !known && self.contexts.len() >= limits.max_contexts {
            return None;
        }

        let mut contexts = self.contexts.clone();
        contexts.insert(unit.context.clone());
        Some(DayLoad {
            remaining: (self.remaining - unit.effort).max(0.0),
            contexts,
            focus_blocks: self.focus_blocks + 1,
        })
    }
}

struct FoldState {
    pending: Vec<WorkUnit>,
    blocks: Vec<PlanBlock>,
}

impl FoldState {
    fn new(queue: Vec<WorkUnit>) -> Self {
        Self {
            pending: queue,
            blocks: Vec::new(),
        }
    }

    fn finish(self) -> Plan {
        Plan {
            blocks: self.blocks,
            unscheduled: self.pending.into_iter().flat_map(|u| u.items).collect(),
        }
    }
}

fn plan_day(state: FoldState, day: NaiveDate, calendar: &WorkCalendar, limits: &DayLimits) -> FoldState {
    let FoldState { pending, mut blocks } = state;

    let (load, admitted, deferred) = pending.into_iter().fold(
        (DayLoad::open(calendar.available_capacity(day)), Vec::new(), Vec::new()),
        |(load, mut admitted, mut deferred), unit| match load.admit(&unit, limits) {
            Some(next) => {
                admitted.push(unit);
                (next, admitted, deferred)
            }
            None => {
                deferred.push(unit);
                (load, admitted, deferred)
            }
        },
    );

    debug!(
        %day,
        admitted = admitted.len(),
        deferred = deferred.len(),
        remaining = load.remaining,
        contexts = load.contexts.len(),
        "planned day"
    );

    let worked = !admitted.is_empty();
    blocks.extend(admitted.into_iter().map(|unit| {
        PlanBlock::focus(day, unit.context, unit.items, unit.effort).with_note(unit.note)
    }));

    for r in calendar.reservations_on(day) {
        let mut block = PlanBlock::reservation(day, r.bucket, r.hours);
        block.note = r.note.clone();
        blocks.push(block);
    }

    if limits.buffer_block && worked && calendar.buffer_capacity() > 0.0 {
        blocks.push(
            PlanBlock::reservation(day, PlanBucket::Admin, calendar.buffer_capacity())
                .with_note(BUFFER_NOTE),
        );
    }

    FoldState {
        pending: deferred,
        blocks,
    }
}

/// Reservations on every visited workday were emitted; the rest fall on
/// non-workdays or outside the horizon.
fn log_ignored_reservations(calendar: &WorkCalendar, start: NaiveDate, last_day: Option<NaiveDate>) {
    for r in &calendar.reservations {
        let visited = calendar.is_workday(r.date)
            && r.date >= start
            && last_day.is_some_and(|last| r.date <= last);
        if !visited {
            debug!(date = %r.date, "reservation outside the horizon's workdays, ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::AffinityEngine;
    use crate::models::{Reservation, WorkItem};
    use crate::scheduler::PriorityRule;
    use chrono::Datelike;

    // 2025-06-02 is a Monday.
    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn item(id: &str, effort: f64) -> WorkItem {
        WorkItem::new(id).with_effort(effort)
    }

    fn flat() -> PlanConstraints {
        PlanConstraints::new().with_buffer_ratio(0.0)
    }

    fn run(items: &[WorkItem], horizon: u32, c: &PlanConstraints) -> Plan {
        PlanScheduler::new()
            .schedule(&WorkPool::items(items), day(2), horizon, c)
            .unwrap()
    }

    #[test]
    fn test_empty_pool() {
        let c = PlanConstraints::new().with_reservation(Reservation::meeting(day(2), 1.0));
        let plan = run(&[], 10, &c);
        assert!(plan.is_empty());
        assert!(plan.unscheduled.is_empty());
    }

    #[test]
    fn test_singleton_group_on_first_workday() {
        let items = vec![item("only", 1.0)];
        let groups = AffinityEngine::new().compute(&items).unwrap();
        // Saturday start → first eligible workday is Monday the 9th.
        let plan = PlanScheduler::new()
            .schedule(
                &WorkPool::grouped(&groups, &items),
                day(7),
                10,
                &PlanConstraints::default(),
            )
            .unwrap();

        assert_eq!(plan.block_count(), 1);
        let block = &plan.blocks[0];
        assert_eq!(block.date, day(9));
        assert_eq!(block.bucket, PlanBucket::Focus);
        assert_eq!(block.items, vec!["only"]);
        assert_eq!(block.note.as_deref(), Some("misc (1 item)"));
    }

    #[test]
    fn test_shared_context_lands_in_one_block() {
        let items = vec![
            item("A", 2.0).with_tags(["aws.lambda", "terraform"]),
            item("B", 1.0).with_tags(["aws.lambda", "iam"]),
        ];
        let groups = AffinityEngine::new().compute(&items).unwrap();
        let plan = PlanScheduler::new()
            .schedule(&WorkPool::grouped(&groups, &items), day(2), 10, &PlanConstraints::default())
            .unwrap();

        assert_eq!(plan.block_count(), 1);
        assert_eq!(plan.blocks[0].items, vec!["A", "B"]);
        assert_eq!(plan.blocks[0].context.as_deref(), Some("aws.lambda"));
        assert!((plan.blocks[0].effort - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_overflow_one_item_per_day() {
        let c = PlanConstraints::new().with_max_focus_blocks_per_day(1);
        let full_day = c.calendar().nominal_available();
        let items: Vec<_> = (0..10).map(|i| item(&format!("T{i}"), full_day)).collect();

        let plan = run(&items, 14, &c);
        assert!(plan.unscheduled.is_empty());
        let dates = plan.dates();
        assert_eq!(dates.len(), 10);
        for d in dates {
            assert_eq!(plan.focus_blocks_on(d).len(), 1);
        }
        // Input order preserved on equal effort.
        assert_eq!(plan.blocks[0].items, vec!["T0"]);
        assert_eq!(plan.blocks[9].items, vec!["T9"]);
    }

    #[test]
    fn test_overflow_with_workday_horizon() {
        let c = PlanConstraints::new()
            .with_max_focus_blocks_per_day(1)
            .with_horizon_unit(HorizonUnit::Workdays);
        let full_day = c.calendar().nominal_available();
        let items: Vec<_> = (0..12).map(|i| item(&format!("T{i}"), full_day)).collect();

        let plan = run(&items, 10, &c);
        assert_eq!(plan.dates().len(), 10);
        assert_eq!(plan.unscheduled, vec!["T10", "T11"]);
    }

    #[test]
    fn test_smaller_units_fill_remaining_capacity() {
        let c = flat().with_max_contexts_per_day(4);
        let items = vec![item("small", 2.0), item("big", 7.0), item("tiny", 1.0)];
        let plan = run(&items, 5, &c);

        let monday: Vec<_> = plan.focus_blocks_on(day(2)).iter().map(|b| b.items[0].clone()).collect();
        assert_eq!(monday, vec!["big", "tiny"]);
        assert_eq!(plan.block_for_item("small").unwrap().date, day(3));
    }

    #[test]
    fn test_context_limit_defers_new_contexts() {
        let c = flat().with_max_contexts_per_day(2);
        let items = vec![
            item("a", 1.0).with_tag("alpha"),
            item("b", 1.0).with_tag("beta"),
            item("c", 1.0).with_tag("gamma"),
            item("a2", 1.0).with_tag("alpha.sub"),
        ];
        let plan = run(&items, 5, &c);

        assert_eq!(plan.contexts_on(day(2)).into_iter().collect::<Vec<_>>(), vec!["alpha", "beta"]);
        // Same top-level context rides along on Monday.
        assert_eq!(plan.block_for_item("a2").unwrap().date, day(2));
        assert_eq!(plan.block_for_item("c").unwrap().date, day(3));
    }

    #[test]
    fn test_focus_block_limit() {
        let c = flat().with_max_focus_blocks_per_day(2);
        let items: Vec<_> = (0..5)
            .map(|i| item(&format!("x{i}"), 0.5).with_tag("k8s"))
            .collect();
        let plan = run(&items, 5, &c);
        assert_eq!(plan.focus_blocks_on(day(2)).len(), 2);
        assert_eq!(plan.focus_blocks_on(day(3)).len(), 2);
        assert_eq!(plan.focus_blocks_on(day(4)).len(), 1);
    }

    #[test]
    fn test_custom_workdays() {
        let c = flat().with_workdays([0, 2, 4]).with_max_focus_blocks_per_day(1);
        let items: Vec<_> = (0..6).map(|i| item(&format!("w{i}"), 8.0)).collect();
        let plan = run(&items, 7, &c);

        assert_eq!(plan.dates(), vec![day(2), day(4), day(6)]);
        for b in &plan.blocks {
            assert!([0, 2, 4].contains(&b.date.weekday().num_days_from_monday()));
        }
        assert_eq!(plan.unscheduled.len(), 3);
    }

    #[test]
    fn test_reservations_reduce_capacity() {
        let c = flat()
            .with_reservation(Reservation::meeting(day(2), 3.0).with_note("sprint planning"))
            .with_reservation(Reservation::admin(day(7), 2.0));
        let items = vec![item("six", 6.0), item("five", 5.0)];
        let plan = run(&items, 7, &c);

        let monday = plan.blocks_on(day(2));
        assert_eq!(monday.len(), 2);
        assert_eq!(monday[0].items, vec!["five"]);
        assert_eq!(monday[1].bucket, PlanBucket::Meeting);
        assert_eq!(monday[1].note.as_deref(), Some("sprint planning"));
        assert!(monday[1].items.is_empty());
        assert_eq!(plan.block_for_item("six").unwrap().date, day(3));
        // Saturday reservation is not a workday.
        assert!(plan.blocks_on(day(7)).is_empty());
    }

    #[test]
    fn test_buffer_block() {
        let c = PlanConstraints::new()
            .with_buffer_ratio(0.25)
            .with_buffer_block(true);
        let plan = run(&[item("a", 1.0)], 5, &c);

        assert_eq!(plan.block_count(), 2);
        let buffer = &plan.blocks[1];
        assert_eq!(buffer.bucket, PlanBucket::Admin);
        assert_eq!(buffer.note.as_deref(), Some(BUFFER_NOTE));
        assert!((buffer.effort - 2.0).abs() < 1e-10);
        // Idle days get no buffer block.
        assert!(plan.blocks_on(day(3)).is_empty());
    }

    #[test]
    fn test_oversized_group_spans_days() {
        let items = vec![
            item("a", 3.0).with_tag("k8s"),
            item("b", 3.0).with_tag("k8s"),
            item("c", 3.0).with_tag("k8s"),
        ];
        let groups = AffinityEngine::new().compute(&items).unwrap();
        assert_eq!(groups.len(), 1);

        let plan = PlanScheduler::new()
            .schedule(&WorkPool::grouped(&groups, &items), day(2), 5, &PlanConstraints::default())
            .unwrap();
        assert_eq!(plan.focus_blocks_on(day(2))[0].items, vec!["a", "b"]);
        assert_eq!(plan.focus_blocks_on(day(3))[0].items, vec!["c"]);
        assert_eq!(plan.focus_blocks_on(day(3))[0].context.as_deref(), Some("k8s"));
    }

    #[test]
    fn test_item_larger_than_a_day_is_unscheduled() {
        let plan = run(&[item("epic", 20.0), item("ok", 1.0)], 14, &PlanConstraints::default());
        assert_eq!(plan.unscheduled, vec!["epic"]);
        assert_eq!(plan.block_for_item("ok").unwrap().date, day(2));
    }

    #[test]
    fn test_earliest_due_priority() {
        let c = flat()
            .with_max_focus_blocks_per_day(1)
            .with_priority(vec![PriorityRule::EarliestDue]);
        let items = vec![
            item("later", 1.0).with_due_date(day(20)),
            item("sooner", 1.0).with_due_date(day(10)),
        ];
        let plan = run(&items, 5, &c);
        assert_eq!(plan.blocks[0].items, vec!["sooner"]);
        assert_eq!(plan.blocks[1].items, vec!["later"]);
    }

    #[test]
    fn test_invalid_constraints() {
        let items = vec![item("a", 1.0)];
        let s = PlanScheduler::new();
        let pool = WorkPool::items(&items);

        let zero_horizon = s.schedule(&pool, day(2), 0, &PlanConstraints::default());
        assert!(matches!(zero_horizon, Err(PlanError::InvalidConstraint(_))));

        let bad_buffer = s.schedule(&pool, day(2), 10, &PlanConstraints::new().with_buffer_ratio(1.0));
        assert!(matches!(bad_buffer, Err(PlanError::InvalidConstraint(_))));

        let bad_ctx = s.schedule(&pool, day(2), 10, &PlanConstraints::new().with_max_contexts_per_day(0));
        assert!(matches!(bad_ctx, Err(PlanError::InvalidConstraint(_))));

        let bad_focus = s.schedule(&pool, day(2), 10, &PlanConstraints::new().with_max_focus_blocks_per_day(0));
        assert!(matches!(bad_focus, Err(PlanError::InvalidConstraint(_))));
    }

    #[test]
    fn test_empty_grouped_pool_still_validates_groups() {
        let groups = vec![crate::models::AffinityGroup::new("iam").with_member("ghost")];
        let result = PlanScheduler::new().schedule(
            &WorkPool::grouped(&groups, &[]),
            day(2),
            10,
            &PlanConstraints::default(),
        );
        assert!(matches!(result, Err(PlanError::InvalidInput(msg)) if msg.contains("ghost")));
    }

    #[test]
    fn test_unbounded_horizon_terminates() {
        let items = vec![item("ok", 1.0), item("epic", 20.0)];
        for unit in [HorizonUnit::CalendarDays, HorizonUnit::Workdays] {
            let c = PlanConstraints::new().with_horizon_unit(unit);
            let plan = run(&items, u32::MAX, &c);
            assert_eq!(plan.block_for_item("ok").unwrap().date, day(2));
            assert_eq!(plan.unscheduled, vec!["epic"]);
        }
    }

    #[test]
    fn test_reservation_after_last_work_is_kept() {
        let c = flat().with_reservation(Reservation::meeting(day(12), 2.0));
        let plan = run(&[item("a", 1.0)], 14, &c);
        assert_eq!(plan.block_count(), 2);
        assert_eq!(plan.blocks_on(day(12))[0].bucket, PlanBucket::Meeting);
    }

    #[test]
    fn test_invalid_effort() {
        let err = run_err(&[item("neg", -1.0)]);
        assert!(matches!(err, PlanError::InvalidInput(_)));
    }

    fn run_err(items: &[WorkItem]) -> PlanError {
        PlanScheduler::new()
            .schedule(&WorkPool::items(items), day(2), 10, &PlanConstraints::default())
            .unwrap_err()
    }

    #[test]
    fn test_request_and_replacement() {
        let items = vec![item("a", 1.0), item("b", 2.0)];
        let request = PlanRequest::two_week(day(2));
        assert_eq!(request.constraints.horizon_unit, HorizonUnit::Workdays);

        let s = PlanScheduler::new();
        let first = s.schedule_request(&WorkPool::items(&items), &request).unwrap();
        let second = s.schedule_request(&WorkPool::items(&items), &request).unwrap();
        assert_eq!(first, second);

        // Re-running with clear_existing_from_start reproduces the same set.
        let stored = request.replace_existing(&first, &[]);
        let replaced = request.replace_existing(&second, &stored);
        assert_eq!(replaced, stored);

        let appended = request
            .clone()
            .with_clear_existing(false)
            .replace_existing(&second, &stored);
        assert_eq!(appended.len(), 2 * stored.len());
    }
}
