//! Result aggregation.
//!
//! Pure summaries over the final assignments and schedule: per-staff
//! loads, per-group coverage, and run-wide statistics.
//!
//! # Statistics
//!
//! | Statistic | Definition |
//! |-----------|-----------|
//! | assigned_staff | Staff holding at least one assignment |
//! | fully_loaded_staff | Staff whose total hours reach their cap |
//! | average_workload | Mean total hours (teaching + committed) over all staff |
//! | group_distribution | Group → number of distinct staff working in it |

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::allocator::{Assignee, WorkUnitOutcome};
use crate::capability::CapabilityIndex;
use crate::models::{normalize_key, AllocationPhase, Assignment, Schedule, SubjectKind};

/// One piece of work held by a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectLoad {
    /// Group the work belongs to.
    pub group: String,
    /// Subject or work-unit label.
    pub label: String,
    /// Work unit, for primary work.
    pub work_unit_id: Option<String>,
    /// Weekly hours.
    pub hours: u32,
    /// Producing phase.
    pub phase: AllocationPhase,
}

/// Per-staff summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffSummary {
    pub staff_id: String,
    pub name: String,
    pub employment_status: String,
    pub on_leave: bool,
    /// Groups the staff member works in, first-assigned first.
    pub groups: Vec<String>,
    pub subjects: Vec<SubjectLoad>,
    pub teaching_hours: u32,
    pub committed_hours: u32,
    /// Teaching plus committed hours.
    pub total_hours: u32,
    /// Effective weekly cap.
    pub max_hours: u32,
    pub remaining_hours: u32,
    pub scheduled_minutes: u32,
    pub fully_loaded: bool,
}

/// Coverage of one catalog subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStatus {
    pub subject: String,
    pub kind: SubjectKind,
    pub hours: u32,
    pub assignee: Assignee,
}

/// Per-group summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: String,
    /// Distinct staff working in the group, first-assigned first.
    pub staff: Vec<String>,
    pub staff_count: usize,
    pub work_units: usize,
    pub unassigned_work_units: usize,
    /// Catalog subjects and who holds them (empty for groups outside the catalog).
    pub subjects: Vec<SubjectStatus>,
}

/// Run-wide statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationStatistics {
    pub total_staff: usize,
    pub assigned_staff: usize,
    pub unassigned_staff: usize,
    pub fully_loaded_staff: usize,
    pub average_workload: f64,
    pub group_distribution: BTreeMap<String, usize>,
    pub total_work_units: usize,
    pub assigned_work_units: usize,
    pub unassigned_work_units: usize,
    pub total_assignments: usize,
    pub scheduled_entries: usize,
    pub unscheduled_items: usize,
    pub schedule_conflicts: usize,
}

/// Aggregated view of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub staff: Vec<StaffSummary>,
    /// Staff with no assignment after both phases.
    pub unassigned_staff: Vec<String>,
    pub groups: Vec<GroupSummary>,
    pub statistics: AllocationStatistics,
}

/// Summarizes a finished run.
///
/// Empty input yields an empty but well-formed summary.
pub fn summarize(
    index: &CapabilityIndex,
    assignments: &[Assignment],
    outcomes: &[WorkUnitOutcome],
    schedule: &Schedule,
) -> Summary {
    let staff: Vec<StaffSummary> = index
        .staff()
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let held: Vec<&Assignment> = assignments
                .iter()
                .filter(|a| a.staff_id == member.id)
                .collect();
            let teaching_hours: u32 = held.iter().map(|a| a.hours).sum();
            let committed_hours = member.committed_hours();
            let total_hours = teaching_hours.saturating_add(committed_hours);
            let max_hours = index.cap(i);

            let mut groups: Vec<String> = Vec::new();
            for a in &held {
                if !groups.iter().any(|g| normalize_key(g) == normalize_key(&a.group)) {
                    groups.push(a.group.clone());
                }
            }

            StaffSummary {
                staff_id: member.id.clone(),
                name: member.name.clone(),
                employment_status: member.employment_status.clone(),
                on_leave: member.on_leave,
                groups,
                subjects: held
                    .iter()
                    .map(|a| SubjectLoad {
                        group: a.group.clone(),
                        label: a.label().to_string(),
                        work_unit_id: a.work_unit_id.clone(),
                        hours: a.hours,
                        phase: a.phase,
                    })
                    .collect(),
                teaching_hours,
                committed_hours,
                total_hours,
                max_hours,
                remaining_hours: max_hours.saturating_sub(total_hours),
                scheduled_minutes: schedule.scheduled_minutes(&member.id),
                fully_loaded: total_hours >= max_hours,
            }
        })
        .collect();

    let unassigned_staff: Vec<String> = staff
        .iter()
        .filter(|s| s.subjects.is_empty())
        .map(|s| s.staff_id.clone())
        .collect();

    let groups = group_summaries(index, assignments, outcomes);

    let total_hours: u64 = staff.iter().map(|s| u64::from(s.total_hours)).sum();
    let assigned_work_units = outcomes.iter().filter(|o| o.assignee.is_assigned()).count();
    let statistics = AllocationStatistics {
        total_staff: staff.len(),
        assigned_staff: staff.len() - unassigned_staff.len(),
        unassigned_staff: unassigned_staff.len(),
        fully_loaded_staff: staff.iter().filter(|s| s.fully_loaded).count(),
        average_workload: if staff.is_empty() {
            0.0
        } else {
            total_hours as f64 / staff.len() as f64
        },
        group_distribution: groups
            .iter()
            .filter(|g| g.staff_count > 0)
            .map(|g| (g.group.clone(), g.staff_count))
            .collect(),
        total_work_units: outcomes.len(),
        assigned_work_units,
        unassigned_work_units: outcomes.len() - assigned_work_units,
        total_assignments: assignments.len(),
        scheduled_entries: schedule.entry_count(),
        unscheduled_items: schedule.unscheduled.len(),
        schedule_conflicts: schedule.conflicts.len(),
    };

    Summary {
        staff,
        unassigned_staff,
        groups,
        statistics,
    }
}

/// Catalog groups in catalog order, then any other group seen on work
/// units or assignments, first-seen order.
fn group_summaries(
    index: &CapabilityIndex,
    assignments: &[Assignment],
    outcomes: &[WorkUnitOutcome],
) -> Vec<GroupSummary> {
    let mut names: Vec<String> = Vec::new();
    let mut seen = BTreeSet::new();
    let catalog_names = index.catalog().groups.iter().map(|g| &g.group);
    let other_names = outcomes
        .iter()
        .map(|o| &o.group)
        .chain(assignments.iter().map(|a| &a.group));
    for name in catalog_names.chain(other_names) {
        if seen.insert(normalize_key(name)) {
            names.push(name.clone());
        }
    }

    names
        .into_iter()
        .map(|group| {
            let key = normalize_key(&group);
            let in_group = |g: &str| normalize_key(g) == key;

            let mut staff: Vec<String> = Vec::new();
            for a in assignments.iter().filter(|a| in_group(&a.group)) {
                if !staff.contains(&a.staff_id) {
                    staff.push(a.staff_id.clone());
                }
            }

            let units: Vec<&WorkUnitOutcome> = outcomes.iter().filter(|o| in_group(&o.group)).collect();
            let subjects = index
                .catalog()
                .group(&group)
                .map(|curriculum| {
                    curriculum
                        .subjects_in_claim_order()
                        .map(|(kind, subject)| {
                            let subject_key = normalize_key(&subject.name);
                            let holders = assignments
                                .iter()
                                .filter(|a| {
                                    in_group(&a.group)
                                        && a.subject.as_deref().map(normalize_key).as_ref()
                                            == Some(&subject_key)
                                })
                                .map(|a| a.staff_id.clone())
                                .collect();
                            SubjectStatus {
                                subject: subject.name.clone(),
                                kind,
                                hours: subject.hours_per_week,
                                assignee: Assignee::from_ids(holders),
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();

            GroupSummary {
                group,
                staff_count: staff.len(),
                staff,
                work_units: units.len(),
                unassigned_work_units: units.iter().filter(|o| !o.assignee.is_assigned()).count(),
                subjects,
            }
        })
        .collect()
}
