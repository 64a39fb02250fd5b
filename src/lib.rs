//! Work batching and two-week planning.
//!
//! Clusters tagged work items into affinity groups that share technical
//! context, then lays those groups onto dated Focus blocks across a
//! planning horizon without exceeding daily capacity or the number of
//! distinct contexts a person should juggle in one day.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `WorkItem`, `TagSet`, `AffinityGroup`,
//!   `WorkCalendar`, `Reservation`, `Plan`, `PlanBlock`
//! - **`affinity`**: Specificity-weighted tag similarity and greedy grouping
//! - **`scheduler`**: Capacity-aware day planner and plan KPIs
//! - **`config`**: Grouping and scheduling parameters
//! - **`validation`**: Input integrity checks (duplicate ids, bad effort,
//!   dangling group members)
//!
//! # Pipeline
//!
//! ```
//! use chrono::NaiveDate;
//! use u_workplan::affinity::AffinityEngine;
//! use u_workplan::config::PlanConstraints;
//! use u_workplan::models::WorkItem;
//! use u_workplan::scheduler::{PlanScheduler, WorkPool};
//!
//! let items = vec![
//!     WorkItem::new("A").with_tags(["aws.lambda", "terraform"]).with_effort(2.0),
//!     WorkItem::new("B").with_tags(["aws.lambda", "iam"]).with_effort(1.0),
//! ];
//! let groups = AffinityEngine::new().compute(&items).unwrap();
//! let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
//! let plan = PlanScheduler::new()
//!     .schedule(&WorkPool::grouped(&groups, &items), start, 14, &PlanConstraints::default())
//!     .unwrap();
//! assert_eq!(plan.focus_blocks_on(start).len(), 1);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Manning, Raghavan & Schütze (2008), "Introduction to Information
//!   Retrieval", Ch. 6: Term weighting

pub mod affinity;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{PlanError, Result};
