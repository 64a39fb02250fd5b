//! Planning domain models.
//!
//! Plain in-memory records exchanged with the surrounding service layer.
//! None of these types know about storage or transport.
//!
//! # Domain Mappings
//!
//! | u-workplan | Ticket tracker | u-schedule |
//! |------------|----------------|------------|
//! | WorkItem | Subtask | Activity |
//! | AffinityGroup | Batch | Task category |
//! | PlanBlock | Plan item | Assignment |
//! | WorkCalendar | Team calendar | Calendar |

mod affinity_group;
mod calendar;
mod plan;
mod tags;
mod work_item;

pub use affinity_group::{merge_groups, AffinityGroup, NO_SHARED_CONTEXT};
pub use calendar::{HorizonUnit, Reservation, WorkCalendar, STANDARD_WORKWEEK};
pub use plan::{Plan, PlanBlock, PlanBucket};
pub use tags::{normalize_tag, top_level, TagSet};
pub use work_item::{eligible, WorkItem, WorkStatus};
