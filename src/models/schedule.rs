//! Allocation and schedule (solution) models.
//!
//! An [`Assignment`] is an edge of the staff × work bipartite match.
//! A [`ScheduleEntry`] is a concrete weekly placement of assigned work.
//! A [`Schedule`] collects entries together with the work that could not
//! be placed and the fixed placements that had to be moved.

use serde::{Deserialize, Serialize};

use super::{TimeWindow, Weekday};

/// The phase that produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPhase {
    /// Greedy capacity-bounded allocation of work units.
    Primary,
    /// Subject top-up for under-utilized staff.
    Saturation,
}

/// A staff → work assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned staff ID.
    pub staff_id: String,
    /// Group (strand) the work belongs to.
    pub group: String,
    /// Work unit, for primary assignments.
    pub work_unit_id: Option<String>,
    /// Subject, when the work is subject-level.
    pub subject: Option<String>,
    /// Weekly hours charged.
    pub hours: u32,
    /// Suitability score at assignment time.
    pub score: f64,
    /// Producing phase.
    pub phase: AllocationPhase,
}

impl Assignment {
    /// Label shown on schedule entries.
    pub fn label(&self) -> &str {
        self.subject
            .as_deref()
            .or(self.work_unit_id.as_deref())
            .unwrap_or(&self.group)
    }
}

/// A concrete weekly placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Staff holding the entry.
    pub staff_id: String,
    /// Day of the week.
    pub day: Weekday,
    /// Time window.
    #[serde(flatten)]
    pub window: TimeWindow,
    /// Work label (subject or work unit).
    pub label: String,
}

impl ScheduleEntry {
    /// Creates an entry.
    pub fn new(
        staff_id: impl Into<String>,
        day: Weekday,
        window: TimeWindow,
        label: impl Into<String>,
    ) -> Self {
        Self {
            staff_id: staff_id.into(),
            day,
            window,
            label: label.into(),
        }
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.window.duration_minutes()
    }

    /// Whether two entries collide (same staff, same day, overlapping time).
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.staff_id == other.staff_id && self.day == other.day && self.window.overlaps(&other.window)
    }
}

/// Why an item could not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// Every grid slot was tried without a feasible placement.
    GridExhausted,
    /// The staff member has no remaining weekly capacity.
    CapacityExhausted,
}

/// A work item left without a placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledItem {
    /// Staff the work is assigned to.
    pub staff_id: String,
    /// Work label.
    pub label: String,
    /// Reason.
    pub reason: UnscheduledReason,
}

/// A fixed placement rejected by feasibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    /// Staff the work is assigned to.
    pub staff_id: String,
    /// Work label.
    pub label: String,
    /// The rejected day.
    pub day: Weekday,
    /// The rejected window.
    pub window: TimeWindow,
    /// Human-readable description.
    pub message: String,
}

/// Weekly schedule across all staff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Committed placements, in commit order.
    pub entries: Vec<ScheduleEntry>,
    /// Items with no feasible placement.
    pub unscheduled: Vec<UnscheduledItem>,
    /// Fixed placements that were rejected and re-scanned.
    pub conflicts: Vec<ScheduleConflict>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    /// Returns all entries held by a staff member.
    pub fn entries_for_staff(&self, staff_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.staff_id == staff_id)
            .collect()
    }

    /// Total scheduled minutes for a staff member.
    pub fn scheduled_minutes(&self, staff_id: &str) -> u32 {
        self.entries_for_staff(staff_id)
            .iter()
            .map(|e| e.duration_minutes())
            .sum()
    }

    /// Whether any staff member holds two overlapping same-day entries.
    pub fn has_overlaps(&self) -> bool {
        self.entries.iter().enumerate().any(|(i, a)| {
            self.entries[i + 1..].iter().any(|b| a.conflicts_with(b))
        })
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
