//! Work unit model.
//!
//! A work unit is a weekly teaching load owned by a group (strand):
//! it requires a skill set, a number of hours per week, and optionally
//! a fixed day and time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{normalize_key, ClockTime, TimeWindow, Weekday};

/// A unit of required work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    /// Unique work-unit identifier.
    pub id: String,
    /// Owning group (strand).
    pub group: String,
    /// Subject taught, when the unit is subject-level.
    pub subject: Option<String>,
    /// Grade level, when known.
    pub grade_level: Option<String>,
    /// Normalized required skill/certification keys.
    pub required_skills: BTreeSet<String>,
    /// Hours charged to each assigned staff member per week.
    pub hours_per_week: u32,
    /// Fixed placement, if the timetable already dictates one.
    pub fixed_slot: Option<FixedSlot>,
    /// Requested shift (e.g. "early"), if any.
    pub shift: Option<String>,
    /// Whether the unit is critical.
    pub critical: bool,
    /// Maximum number of staff assigned; `None` uses the engine default.
    pub staff_quota: Option<usize>,
}

/// A fixed weekly placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSlot {
    /// Day of the week.
    pub day: Weekday,
    /// Time window within the day.
    pub window: TimeWindow,
}

impl FixedSlot {
    /// Creates a fixed slot. Returns `None` unless `start < end`.
    pub fn new(day: Weekday, start: ClockTime, end: ClockTime) -> Option<Self> {
        TimeWindow::new(start, end).map(|window| Self { day, window })
    }
}

impl WorkUnit {
    /// Creates a work unit for a group.
    pub fn new(id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            subject: None,
            grade_level: None,
            required_skills: BTreeSet::new(),
            hours_per_week: 0,
            fixed_slot: None,
            shift: None,
            critical: false,
            staff_quota: None,
        }
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the grade level.
    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.grade_level = Some(grade.into());
        self
    }

    /// Adds a required skill.
    pub fn with_required_skill(mut self, skill: &str) -> Self {
        self.required_skills.insert(normalize_key(skill));
        self
    }

    /// Sets weekly hours.
    pub fn with_hours(mut self, hours: u32) -> Self {
        self.hours_per_week = hours;
        self
    }

    /// Sets a fixed placement.
    pub fn with_fixed_slot(mut self, slot: FixedSlot) -> Self {
        self.fixed_slot = Some(slot);
        self
    }

    /// Sets the requested shift.
    pub fn with_shift(mut self, shift: impl Into<String>) -> Self {
        self.shift = Some(shift.into());
        self
    }

    /// Marks the unit critical.
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Sets the staff quota.
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.staff_quota = Some(quota);
        self
    }

    /// Label used for schedule entries: the subject, or the group.
    pub fn label(&self) -> &str {
        self.subject.as_deref().unwrap_or(&self.group)
    }
}
