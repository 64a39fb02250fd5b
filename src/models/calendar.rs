//! Work calendar and capacity reservations.
//!
//! Defines which days are eligible for scheduling and how much item
//! capacity each day offers.
//!
//! # Capacity Model
//! A workday's available capacity is
//! `daily_capacity × (1 − buffer_ratio) − reserved(date)`, floored at zero.
//! Reservations are caller-declared Admin/Meeting time on a specific date.
//!
//! # Weekday Indices
//! Monday = 0 … Sunday = 6.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::PlanBucket;

/// Monday through Friday.
pub const STANDARD_WORKWEEK: [u8; 5] = [0, 1, 2, 3, 4];

/// How a horizon length is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonUnit {
    /// Consider `n` consecutive calendar days, skipping non-workdays.
    #[default]
    CalendarDays,
    /// Consider the first `n` workdays from the start date.
    Workdays,
}

/// Externally reserved capacity on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reserved day.
    pub date: NaiveDate,
    /// Admin or Meeting.
    pub bucket: PlanBucket,
    /// Capacity taken out of the day.
    pub hours: f64,
    /// Note copied onto the emitted block.
    #[serde(default)]
    pub note: Option<String>,
}

impl Reservation {
    /// Creates a meeting reservation.
    pub fn meeting(date: NaiveDate, hours: f64) -> Self {
        Self {
            date,
            bucket: PlanBucket::Meeting,
            hours,
            note: None,
        }
    }

    /// Creates an admin reservation.
    pub fn admin(date: NaiveDate, hours: f64) -> Self {
        Self {
            date,
            bucket: PlanBucket::Admin,
            hours,
            note: None,
        }
    }

    /// Sets the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Workday and capacity calendar for one scheduling run.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkCalendar {
    /// Eligible weekday indices.
    pub workdays: BTreeSet<u8>,
    /// Nominal capacity of a workday.
    pub daily_capacity: f64,
    /// Fraction of nominal capacity never assigned to items.
    pub buffer_ratio: f64,
    /// Pre-declared reservations.
    pub reservations: Vec<Reservation>,
}

impl WorkCalendar {
    /// Creates a Monday–Friday calendar with no buffer.
    pub fn new(daily_capacity: f64) -> Self {
        Self {
            workdays: STANDARD_WORKWEEK.into_iter().collect(),
            daily_capacity,
            buffer_ratio: 0.0,
            reservations: Vec::new(),
        }
    }

    /// Replaces the workday set.
    pub fn with_workdays(mut self, workdays: impl IntoIterator<Item = u8>) -> Self {
        self.workdays = workdays.into_iter().collect();
        self
    }

    /// Sets the buffer ratio.
    pub fn with_buffer_ratio(mut self, ratio: f64) -> Self {
        self.buffer_ratio = ratio;
        self
    }

    /// Adds a reservation.
    pub fn with_reservation(mut self, reservation: Reservation) -> Self {
        self.reservations.push(reservation);
        self
    }

    /// Whether the date falls on a configured workday.
    pub fn is_workday(&self, date: NaiveDate) -> bool {
        let idx = date.weekday().num_days_from_monday() as u8;
        self.workdays.contains(&idx)
    }

    /// Workdays covered by a horizon, ascending, yielded lazily.
    pub fn horizon_days(
        &self,
        start: NaiveDate,
        horizon: u32,
        unit: HorizonUnit,
    ) -> impl Iterator<Item = NaiveDate> + '_ {
        let horizon = horizon as usize;
        let (calendar_limit, workday_limit) = match unit {
            _ if self.workdays.is_empty() => (0, 0),
            HorizonUnit::CalendarDays => (horizon, usize::MAX),
            HorizonUnit::Workdays => (usize::MAX, horizon),
        };
        start
            .iter_days()
            .take(calendar_limit)
            .filter(move |d| self.is_workday(*d))
            .take(workday_limit)
    }

    /// Workdays covered by a horizon, ascending.
    pub fn days_in_horizon(&self, start: NaiveDate, horizon: u32, unit: HorizonUnit) -> Vec<NaiveDate> {
        self.horizon_days(start, horizon, unit).collect()
    }

    /// Item capacity of a workday before reservations.
    #[inline]
    pub fn nominal_available(&self) -> f64 {
        self.daily_capacity * (1.0 - self.buffer_ratio)
    }

    /// Capacity held back by the buffer.
    #[inline]
    pub fn buffer_capacity(&self) -> f64 {
        self.daily_capacity * self.buffer_ratio
    }

    /// Reservations on a date, in declared order.
    pub fn reservations_on(&self, date: NaiveDate) -> Vec<&Reservation> {
        self.reservations.iter().filter(|r| r.date == date).collect()
    }

    /// Total reserved capacity on a date.
    pub fn reserved_on(&self, date: NaiveDate) -> f64 {
        self.reservations_on(date).iter().map(|r| r.hours).sum()
    }

    /// Item capacity left on a date after buffer and reservations.
    pub fn available_capacity(&self, date: NaiveDate) -> f64 {
        if !self.is_workday(date) {
            return 0.0;
        }
        (self.nominal_available() - self.reserved_on(date)).max(0.0)
    }
}
