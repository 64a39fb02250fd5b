//! Work pool and schedulable units.
//!
//! A unit is the indivisible element the day planner admits: a whole
//! affinity group, a chunk of an oversized group, or a single loose item.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::models::{top_level, AffinityGroup, WorkItem};
use crate::validation::{validate_groups, validate_items};

/// Capacity slack tolerated when comparing float efforts.
pub(crate) const EPSILON: f64 = 1e-9;

/// Input to a scheduling run.
#[derive(Debug, Clone, Copy)]
pub enum WorkPool<'a> {
    /// Affinity groups plus the item snapshot they refer to. Items not in
    /// any group are scheduled on their own.
    Grouped {
        /// Groups, in computed order.
        groups: &'a [AffinityGroup],
        /// Item snapshot.
        items: &'a [WorkItem],
    },
    /// Raw items, each scheduled on its own.
    Items(&'a [WorkItem]),
}

impl<'a> WorkPool<'a> {
    /// Pool built from affinity groups.
    pub fn grouped(groups: &'a [AffinityGroup], items: &'a [WorkItem]) -> Self {
        WorkPool::Grouped { groups, items }
    }

    /// Pool of ungrouped items.
    pub fn items(items: &'a [WorkItem]) -> Self {
        WorkPool::Items(items)
    }

    /// The item snapshot.
    pub fn work_items(&self) -> &'a [WorkItem] {
        match *self {
            WorkPool::Grouped { items, .. } => items,
            WorkPool::Items(items) => items,
        }
    }

    /// Whether there is nothing to schedule.
    pub fn is_empty(&self) -> bool {
        self.work_items().is_empty()
    }

    /// Checks the item snapshot and, for grouped pools, that every group
    /// key is unique and every member exists in the snapshot.
    pub fn validate(&self) -> Result<()> {
        let items = self.work_items();
        validate_items(items)?;
        if let WorkPool::Grouped { groups, .. } = *self {
            validate_groups(groups, items)?;
        }
        Ok(())
    }
}

/// An indivisible scheduling unit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WorkUnit {
    /// Context counted against the per-day limit.
    pub context: String,
    /// Member item ids.
    pub items: Vec<String>,
    /// Capacity this unit consumes.
    pub effort: f64,
    /// Effort used for ranking (whole group for chunks).
    pub rank_effort: f64,
    /// Earliest member due date.
    pub due: Option<NaiveDate>,
    /// Input position of the group or item.
    pub order: usize,
    /// Chunk index within a split group.
    pub chunk: usize,
    /// Block note.
    pub note: String,
}

/// Builds units from a pool. Groups larger than `chunk_limit` are split
/// into consecutive member runs that each fit.
pub(crate) fn build_units(pool: &WorkPool<'_>, chunk_limit: f64) -> Result<Vec<WorkUnit>> {
    pool.validate()?;
    let items = pool.work_items();
    let by_id: HashMap<&str, &WorkItem> = items.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut units = Vec::new();
    let mut grouped: HashSet<&str> = HashSet::new();
    let mut next_order = 0;

    if let WorkPool::Grouped { groups, .. } = *pool {
        let owner = owning_groups(groups);

        for (gi, group) in groups.iter().enumerate() {
            let mut seen = HashSet::new();
            let members: Vec<&WorkItem> = group
                .members
                .iter()
                .map(String::as_str)
                .filter(|&m| owner.get(m) == Some(&gi) && seen.insert(m))
                .filter_map(|m| by_id.get(m).copied())
                .collect();
            if members.is_empty() {
                continue;
            }
            grouped.extend(members.iter().map(|&i| i.id.as_str()));
            units.extend(group_units(&group.key, &members, next_order, chunk_limit));
            next_order += 1;
        }
    }

    for item in items.iter().filter(|i| !grouped.contains(i.id.as_str())) {
        units.push(WorkUnit {
            context: solo_context(item),
            items: vec![item.id.clone()],
            effort: item.effort,
            rank_effort: item.effort,
            due: item.due_date,
            order: next_order,
            chunk: 0,
            note: format!("solo: {}", item.id),
        });
        next_order += 1;
    }

    Ok(units)
}

/// Maps each item to the group that owns it: the lexicographically
/// smallest key among the groups listing it.
fn owning_groups(groups: &[AffinityGroup]) -> HashMap<&str, usize> {
    let mut owner: HashMap<&str, usize> = HashMap::new();
    for (gi, group) in groups.iter().enumerate() {
        for member in &group.members {
            owner
                .entry(member.as_str())
                .and_modify(|current| {
                    if group.key < groups[*current].key {
                        *current = gi;
                    }
                })
                .or_insert(gi);
        }
    }
    owner
}

fn group_units(key: &str, members: &[&WorkItem], order: usize, chunk_limit: f64) -> Vec<WorkUnit> {
    let total: f64 = members.iter().map(|i| i.effort).sum();

    let mut chunks: Vec<Vec<&WorkItem>> = Vec::new();
    if total <= chunk_limit + EPSILON {
        chunks.push(members.to_vec());
    } else {
        let mut current: Vec<&WorkItem> = Vec::new();
        let mut load = 0.0;
        for &item in members {
            if !current.is_empty() && load + item.effort > chunk_limit + EPSILON {
                chunks.push(std::mem::take(&mut current));
                load = 0.0;
            }
            load += item.effort;
            current.push(item);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
    }

    let parts = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(k, chunk)| {
            let note = if parts == 1 {
                format!("{key} ({})", count_label(chunk.len()))
            } else {
                format!("{key} (part {} of {parts}, {})", k + 1, count_label(chunk.len()))
            };
            WorkUnit {
                context: key.to_string(),
                items: chunk.iter().map(|i| i.id.clone()).collect(),
                effort: chunk.iter().map(|i| i.effort).sum(),
                rank_effort: total,
                due: chunk.iter().filter_map(|i| i.due_date).min(),
                order,
                chunk: k,
                note,
            }
        })
        .collect()
}

/// Context of a loose item: top-level segment of its first tag, else its
/// ticket, else the item itself.
pub(crate) fn solo_context(item: &WorkItem) -> String {
    if let Some(tag) = item.tags.first() {
        return top_level(tag).to_string();
    }
    match &item.ticket_id {
        Some(ticket) => format!("ticket:{ticket}"),
        None => format!("solo:{}", item.id),
    }
}

fn count_label(n: usize) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{n} items")
    }
}
