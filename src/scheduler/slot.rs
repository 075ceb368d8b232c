//! Slot scheduler and per-item placement state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::feasible;
use crate::capability::CapabilityIndex;
use crate::config::EngineConfig;
use crate::models::{
    Assignment, ClockTime, FixedSlot, Schedule, ScheduleConflict, ScheduleEntry, TimeWindow,
    UnscheduledItem, UnscheduledReason, Weekday, WorkUnit,
};

/// Placement lifecycle of a work item.
///
/// `Unplaced → Scanning → Placed | Exhausted`. Never moves backward;
/// `Placed` and `Exhausted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementState {
    Unplaced,
    Scanning,
    Placed,
    Exhausted,
}

impl PlacementState {
    /// Whether `next` is a legal successor.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unplaced, Self::Scanning)
                | (Self::Scanning, Self::Placed)
                | (Self::Scanning, Self::Exhausted)
        )
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Placed | Self::Exhausted)
    }
}

/// One placeable piece of assigned work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Staff position.
    pub staff_idx: usize,
    /// Entry label.
    pub label: String,
    /// Duration in minutes.
    pub minutes: u32,
    /// Fixed placement, if any.
    pub fixed_slot: Option<FixedSlot>,
    /// Placement state.
    pub state: PlacementState,
}

impl WorkItem {
    /// Creates an unplaced item.
    pub fn new(staff_idx: usize, label: impl Into<String>, minutes: u32) -> Self {
        Self {
            staff_idx,
            label: label.into(),
            minutes,
            fixed_slot: None,
            state: PlacementState::Unplaced,
        }
    }

    /// Sets a fixed placement; the duration becomes the slot's.
    pub fn with_fixed_slot(mut self, slot: FixedSlot) -> Self {
        self.minutes = slot.window.duration_minutes();
        self.fixed_slot = Some(slot);
        self
    }

    fn advance(&mut self, next: PlacementState) {
        if self.state.can_advance_to(next) {
            self.state = next;
        }
    }
}

/// Grid-scanning slot scheduler.
///
/// # Example
///
/// ```
/// use u_workforce::capability::CapabilityIndex;
/// use u_workforce::models::{AllocationPhase, Assignment, Constraints, CurriculumCatalog, StaffMember};
/// use u_workforce::scheduler::SlotScheduler;
///
/// let index = CapabilityIndex::build(
///     vec![StaffMember::new("T1")],
///     vec![],
///     Constraints::default(),
///     &[],
///     CurriculumCatalog::new(),
/// );
/// let assignment = Assignment {
///     staff_id: "T1".into(),
///     group: "STEM".into(),
///     work_unit_id: None,
///     subject: Some("Basic Calculus".into()),
///     hours: 2,
///     score: 1.0,
///     phase: AllocationPhase::Saturation,
/// };
///
/// let schedule = SlotScheduler::new().schedule(&index, &[assignment]);
/// assert_eq!(schedule.entry_count(), 2);
/// assert!(!schedule.has_overlaps());
/// ```
#[derive(Debug, Clone)]
pub struct SlotScheduler {
    day_start_hour: u16,
    day_end_hour: u16,
    grid_days: Vec<Weekday>,
    session_hours: u16,
}

impl Default for SlotScheduler {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SlotScheduler {
    /// Creates a scheduler with the default grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            day_start_hour: config.day_start_hour,
            day_end_hour: config.day_end_hour,
            grid_days: config.grid_days.clone(),
            session_hours: config.session_hours.max(1),
        }
    }

    /// Expands assignments into work items, in assignment order.
    pub fn work_items(&self, index: &CapabilityIndex, assignments: &[Assignment]) -> Vec<WorkItem> {
        let units: HashMap<&str, &WorkUnit> = index
            .work_units()
            .iter()
            .map(|u| (u.id.as_str(), u))
            .collect();

        let mut items = Vec::new();
        for assignment in assignments {
            let Some(staff_idx) = index.position(&assignment.staff_id) else {
                continue;
            };
            let label = assignment.label();
            let fixed = assignment
                .work_unit_id
                .as_deref()
                .and_then(|id| units.get(id))
                .and_then(|u| u.fixed_slot);

            if let Some(slot) = fixed {
                items.push(WorkItem::new(staff_idx, label, 0).with_fixed_slot(slot));
                continue;
            }

            let mut remaining = assignment.hours;
            while remaining > 0 {
                let hours = remaining.min(u32::from(self.session_hours));
                items.push(WorkItem::new(staff_idx, label, hours * 60));
                remaining -= hours;
            }
        }
        items
    }

    /// Schedules every assignment.
    pub fn schedule(&self, index: &CapabilityIndex, assignments: &[Assignment]) -> Schedule {
        let mut items = self.work_items(index, assignments);
        self.place_items(index, &mut items)
    }

    /// Places work items in order, advancing each to a terminal state.
    pub fn place_items(&self, index: &CapabilityIndex, items: &mut [WorkItem]) -> Schedule {
        let min_rest = index.constraints().min_rest_minutes();
        let limits: Vec<u32> = (0..index.staff_count())
            .map(|i| {
                index
                    .cap(i)
                    .saturating_sub(index.member(i).committed_hours())
                    .saturating_mul(60)
            })
            .collect();
        let mut by_staff: Vec<Vec<ScheduleEntry>> = vec![Vec::new(); index.staff_count()];
        let mut schedule = Schedule::new();

        for item in items.iter_mut() {
            if item.state.is_terminal() {
                continue;
            }
            item.advance(PlacementState::Scanning);

            let member = index.member(item.staff_idx);
            let existing = &by_staff[item.staff_idx];
            let limit = limits[item.staff_idx];
            let used: u32 = existing.iter().map(ScheduleEntry::duration_minutes).sum();

            if used.saturating_add(item.minutes) > limit {
                item.advance(PlacementState::Exhausted);
                schedule.unscheduled.push(UnscheduledItem {
                    staff_id: member.id.clone(),
                    label: item.label.clone(),
                    reason: UnscheduledReason::CapacityExhausted,
                });
                continue;
            }

            let placed = match item.fixed_slot {
                Some(slot) => {
                    let entry = ScheduleEntry::new(&member.id, slot.day, slot.window, &item.label);
                    if feasible(existing.iter().chain([&entry]), limit, min_rest) {
                        Some(entry)
                    } else {
                        let message = describe_rejection(existing, &entry, min_rest);
                        warn!(staff_id = %member.id, label = %item.label, %message, "Fixed slot rejected");
                        schedule.conflicts.push(ScheduleConflict {
                            staff_id: member.id.clone(),
                            label: item.label.clone(),
                            day: slot.day,
                            window: slot.window,
                            message,
                        });
                        self.scan(index, item, existing, limit, min_rest)
                    }
                }
                None => self.scan(index, item, existing, limit, min_rest),
            };

            match placed {
                Some(entry) => {
                    item.advance(PlacementState::Placed);
                    by_staff[item.staff_idx].push(entry.clone());
                    schedule.add_entry(entry);
                }
                None => {
                    debug!(staff_id = %member.id, label = %item.label, "No feasible slot");
                    item.advance(PlacementState::Exhausted);
                    schedule.unscheduled.push(UnscheduledItem {
                        staff_id: member.id.clone(),
                        label: item.label.clone(),
                        reason: UnscheduledReason::GridExhausted,
                    });
                }
            }
        }
        schedule
    }

    /// First feasible grid slot for an item, day-major.
    fn scan(
        &self,
        index: &CapabilityIndex,
        item: &WorkItem,
        existing: &[ScheduleEntry],
        limit: u32,
        min_rest: i32,
    ) -> Option<ScheduleEntry> {
        let member = index.member(item.staff_idx);
        let prefs = &member.preferences;
        let minutes = u16::try_from(item.minutes).ok()?;
        let day_end = ClockTime::from_hour(self.day_end_hour)?;

        for &day in &self.grid_days {
            if !prefs.allows_day(day) {
                continue;
            }
            for hour in self.day_start_hour..self.day_end_hour {
                let Some(window) = ClockTime::from_hour(hour)
                    .and_then(|start| Some((start, start.add_minutes(minutes)?)))
                    .filter(|(_, end)| *end <= day_end)
                    .and_then(|(start, end)| TimeWindow::new(start, end))
                else {
                    break;
                };
                if !prefs.allows_start(window.start) {
                    continue;
                }
                if existing
                    .iter()
                    .any(|e| e.day == day && e.window.overlaps(&window))
                {
                    continue;
                }
                let entry = ScheduleEntry::new(&member.id, day, window, &item.label);
                if feasible(existing.iter().chain([&entry]), limit, min_rest) {
                    return Some(entry);
                }
            }
        }
        None
    }
}

fn describe_rejection(existing: &[ScheduleEntry], entry: &ScheduleEntry, min_rest: i32) -> String {
    match existing.iter().find(|e| e.conflicts_with(entry)) {
        Some(other) => format!(
            "overlaps {} on {} {}-{}",
            other.label, other.day, other.window.start, other.window.end
        ),
        None => format!("leaves less than {min_rest} minutes of rest on {}", entry.day),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AllocationPhase, Constraints, CurriculumCatalog, Preferences, StaffMember, TimeOfDay,
    };

    fn at(hour: u16, minute: u16) -> ClockTime {
        ClockTime::new(hour, minute).unwrap()
    }

    fn primary(staff_id: &str, unit: &WorkUnit) -> Assignment {
        Assignment {
            staff_id: staff_id.into(),
            group: unit.group.clone(),
            work_unit_id: Some(unit.id.clone()),
            subject: unit.subject.clone(),
            hours: unit.hours_per_week,
            score: 1.0,
            phase: AllocationPhase::Primary,
        }
    }

    fn subject(staff_id: &str, name: &str, hours: u32) -> Assignment {
        Assignment {
            staff_id: staff_id.into(),
            group: "STEM".into(),
            work_unit_id: None,
            subject: Some(name.into()),
            hours,
            score: 1.0,
            phase: AllocationPhase::Saturation,
        }
    }

    fn index(staff: Vec<StaffMember>, units: Vec<WorkUnit>, rest_hours: f64) -> CapabilityIndex {
        CapabilityIndex::build(
            staff,
            units,
            Constraints::new(40, rest_hours),
            &[],
            CurriculumCatalog::new(),
        )
    }

    #[test]
    fn test_state_machine() {
        use PlacementState::*;
        assert!(Unplaced.can_advance_to(Scanning));
        assert!(Scanning.can_advance_to(Placed));
        assert!(Scanning.can_advance_to(Exhausted));
        assert!(!Placed.can_advance_to(Scanning));
        assert!(!Exhausted.can_advance_to(Placed));
        assert!(!Unplaced.can_advance_to(Placed));
        assert!(Placed.is_terminal());
        assert!(!Scanning.is_terminal());
    }

    #[test]
    fn test_scenario_d_overlap_moves_to_grid() {
        let first = WorkUnit::new("C1", "STEM")
            .with_subject("Basic Calculus")
            .with_hours(1)
            .with_fixed_slot(FixedSlot::new(Weekday::Monday, at(9, 0), at(10, 0)).unwrap());
        let second = WorkUnit::new("C2", "STEM")
            .with_subject("Pre-Calculus")
            .with_hours(1)
            .with_fixed_slot(FixedSlot::new(Weekday::Monday, at(9, 30), at(10, 30)).unwrap());
        let assignments = vec![primary("T1", &first), primary("T1", &second)];

        // No rest requirement: the first free grid hour on Monday.
        let idx = index(vec![StaffMember::new("T1")], vec![first.clone(), second.clone()], 0.0);
        let schedule = SlotScheduler::new().schedule(&idx, &assignments);
        assert_eq!(schedule.conflicts.len(), 1);
        assert_eq!(schedule.conflicts[0].label, "Pre-Calculus");
        assert!(schedule.conflicts[0].message.contains("overlaps Basic Calculus"));
        assert_eq!(schedule.entry_count(), 2);
        let moved = &schedule.entries[1];
        assert_eq!(moved.day, Weekday::Monday);
        assert_eq!(moved.window.start, at(7, 0));
        assert_eq!(moved.duration_minutes(), 60);
        assert!(!schedule.has_overlaps());

        // Eight hours of rest pushes it to Tuesday morning.
        let idx = index(vec![StaffMember::new("T1")], vec![first, second], 8.0);
        let schedule = SlotScheduler::new().schedule(&idx, &assignments);
        let moved = &schedule.entries[1];
        assert_eq!(moved.day, Weekday::Tuesday);
        assert_eq!(moved.window.start, at(7, 0));
    }

    #[test]
    fn test_sessions_spread_by_rest() {
        let idx = index(vec![StaffMember::new("T1")], vec![], 8.0);
        let schedule = SlotScheduler::new().schedule(&idx, &[subject("T1", "Physics", 4)]);
        let placed: Vec<(Weekday, ClockTime)> = schedule
            .entries
            .iter()
            .map(|e| (e.day, e.window.start))
            .collect();
        // 08:00 to 16:00 is exactly eight hours of rest; 15:00 would leave seven.
        assert_eq!(
            placed,
            vec![
                (Weekday::Monday, at(7, 0)),
                (Weekday::Monday, at(16, 0)),
                (Weekday::Tuesday, at(7, 0)),
                (Weekday::Tuesday, at(16, 0)),
            ]
        );
    }

    #[test]
    fn test_preferences_shape_the_scan() {
        let staff = StaffMember::new("T1").with_preferences(Preferences {
            time_of_day: Some(TimeOfDay::Afternoon),
            days_off: [Weekday::Monday].into(),
            ..Default::default()
        });
        let idx = index(vec![staff], vec![], 0.0);
        let schedule = SlotScheduler::new().schedule(&idx, &[subject("T1", "Physics", 1)]);
        assert_eq!(schedule.entries[0].day, Weekday::Tuesday);
        assert_eq!(schedule.entries[0].window.start, at(12, 0));
    }

    #[test]
    fn test_grid_exhausted_is_reported() {
        let staff = StaffMember::new("T1").with_preferences(Preferences {
            days_off: Weekday::WORK_WEEK.into_iter().collect(),
            ..Default::default()
        });
        let idx = index(vec![staff], vec![], 0.0);
        let mut items = SlotScheduler::new().work_items(&idx, &[subject("T1", "Physics", 1)]);
        let schedule = SlotScheduler::new().place_items(&idx, &mut items);
        assert_eq!(schedule.entry_count(), 0);
        assert_eq!(schedule.unscheduled[0].reason, UnscheduledReason::GridExhausted);
        assert_eq!(items[0].state, PlacementState::Exhausted);
    }

    #[test]
    fn test_capacity_exhausted_is_reported() {
        let staff = StaffMember::new("T1").with_max_hours(3).with_commitments(2, 0);
        let idx = index(vec![staff], vec![], 0.0);
        let schedule = SlotScheduler::new().schedule(&idx, &[subject("T1", "Physics", 2)]);
        assert_eq!(schedule.entry_count(), 1);
        assert_eq!(schedule.unscheduled.len(), 1);
        assert_eq!(schedule.unscheduled[0].reason, UnscheduledReason::CapacityExhausted);
    }

    #[test]
    fn test_session_split() {
        let idx = index(vec![StaffMember::new("T1")], vec![], 0.0);
        let scheduler = SlotScheduler::from_config(&EngineConfig::new().with_session_hours(2));
        let items = scheduler.work_items(&idx, &[subject("T1", "Physics", 5)]);
        let minutes: Vec<u32> = items.iter().map(|i| i.minutes).collect();
        assert_eq!(minutes, vec![120, 120, 60]);
        assert!(items.iter().all(|i| i.state == PlacementState::Unplaced));
    }

    #[test]
    fn test_fixed_slot_kept_when_feasible() {
        let unit = WorkUnit::new("C1", "STEM")
            .with_hours(4)
            .with_fixed_slot(FixedSlot::new(Weekday::Thursday, at(13, 0), at(14, 30)).unwrap());
        let idx = index(vec![StaffMember::new("T1")], vec![unit.clone()], 8.0);
        let schedule = SlotScheduler::new().schedule(&idx, &[primary("T1", &unit)]);
        assert_eq!(schedule.entry_count(), 1);
        assert_eq!(schedule.entries[0].day, Weekday::Thursday);
        assert_eq!(schedule.entries[0].duration_minutes(), 90);
        assert_eq!(schedule.entries[0].label, "C1");
        assert!(schedule.conflicts.is_empty());
    }
}
