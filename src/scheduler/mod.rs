//! Weekly slot scheduling.
//!
//! Turns assignments into concrete [`ScheduleEntry`](crate::models::ScheduleEntry)
//! placements on a repeating week.
//!
//! # Algorithm
//!
//! Each assignment becomes one or more work items:
//! - work with a fixed slot becomes a single item at that slot; if the
//!   slot is infeasible it is reported as a conflict and re-placed by
//!   grid scan with the same duration,
//! - other work is split into sessions and grid-scanned.
//!
//! The grid is `grid_days × hourly starts` within the configured day
//! window, scanned day-major. The first slot that overlaps nothing on
//! the staff member's day, keeps [`feasible`] true, and satisfies their
//! time-of-day and days-off preferences is committed. An exhausted grid
//! leaves the item unscheduled.
//!
//! # Complexity
//! O(i · d · h · e) for i items, d days, h hourly starts and e entries
//! per staff member.

mod feasibility;
mod slot;

pub use feasibility::feasible;
pub use slot::{PlacementState, SlotScheduler, WorkItem};
