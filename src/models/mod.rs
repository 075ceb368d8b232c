//! Workforce allocation domain models.
//!
//! Plain serde data types for the inputs (staff, work units, curriculum,
//! constraints) and outputs (assignments, schedule entries) of an
//! allocation run.
//!
//! # Domain Mappings
//!
//! | u-workforce | School | Clinic | Field Service |
//! |-------------|--------|--------|---------------|
//! | StaffMember | Teacher | Nurse | Technician |
//! | WorkUnit | Class / strand load | Ward shift | Service contract |
//! | Group | Strand | Department | Region |
//! | Subject | Subject | Procedure | Job type |

mod catalog;
mod constraint;
mod schedule;
mod staff;
mod time;
mod work_unit;

pub use catalog::{CurriculumCatalog, GroupCurriculum, Subject, SubjectKind, DEFAULT_SUBJECT_HOURS};
pub use constraint::{Constraints, DEFAULT_MAX_HOURS_PER_WEEK, DEFAULT_MIN_REST_HOURS};
pub use schedule::{
    AllocationPhase, Assignment, Schedule, ScheduleConflict, ScheduleEntry, UnscheduledItem,
    UnscheduledReason,
};
pub use staff::{Preferences, ProficiencyLevel, StaffMember, StaffPreference, TimeOfDay};
pub use time::{ClockTime, ParseClockTimeError, TimeWindow, Weekday};
pub use work_unit::{FixedSlot, WorkUnit};

/// Canonical form for skill, certification, subject and grade keys:
/// trimmed, lowercase, inner whitespace collapsed to single spaces.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
