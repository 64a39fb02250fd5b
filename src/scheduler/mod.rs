//! Two-week plan scheduling and KPI evaluation.
//!
//! # Algorithm
//!
//! `PlanScheduler` is a greedy, priority-driven day filler. Affinity groups
//! (or loose items) become indivisible units; units are ordered by a rule
//! chain and admitted day by day while capacity, the distinct-context limit
//! and the Focus block limit allow. It is not optimal, but it is fast,
//! deterministic and keeps related work on the same day.
//!
//! # KPI
//!
//! `PlanKpi` summarizes completion, per-day utilization and context spread.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod planner;
mod priority;
mod queue;

pub use kpi::PlanKpi;
pub use planner::{PlanRequest, PlanScheduler, BUFFER_NOTE};
pub use priority::PriorityRule;
pub use queue::WorkPool;
