//! Capacity-bounded greedy allocation of work units.
//!
//! # Algorithm
//!
//! For each work unit, in input order:
//! 1. Candidates = available staff whose skills or certifications meet
//!    any required key.
//! 2. Keep the candidates whose preferences accept the unit; if none
//!    do, keep them all.
//! 3. Rank by score (stable, descending).
//! 4. Walk the ranking and commit the unit's hours to each candidate
//!    the ledger accepts, until the quota is filled. A rejected
//!    candidate is skipped, not removed.
//! 5. No commit at all leaves the unit `Unassigned`.
//!
//! A unit naming one of its group's specialized subjects has a quota of
//! one, and none at all once the subject is claimed.
//!
//! # Complexity
//! O(u · s log s) for u work units and s staff.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use super::AllocationState;
use crate::capability::CapabilityIndex;
use crate::models::{AllocationPhase, Assignment, StaffMember, WorkUnit};
use crate::scoring::CandidateScorer;

/// Staff holding a work unit, or the literal `"Unassigned"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignee {
    /// Assigned staff IDs, in commit order (never empty).
    Staff(Vec<String>),
    /// No staff could take the work.
    Unassigned,
}

impl Assignee {
    /// Builds from committed IDs; empty means unassigned.
    pub fn from_ids(ids: Vec<String>) -> Self {
        if ids.is_empty() {
            Self::Unassigned
        } else {
            Self::Staff(ids)
        }
    }

    /// Whether anyone holds the work.
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Staff(_))
    }

    /// Assigned staff IDs (empty when unassigned).
    pub fn staff_ids(&self) -> &[String] {
        match self {
            Self::Staff(ids) => ids,
            Self::Unassigned => &[],
        }
    }
}

const UNASSIGNED: &str = "Unassigned";

impl Serialize for Assignee {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Staff(ids) => ids.serialize(serializer),
            Self::Unassigned => serializer.serialize_str(UNASSIGNED),
        }
    }
}

impl<'de> Deserialize<'de> for Assignee {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Staff(Vec<String>),
            Literal(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Staff(ids) => Ok(Self::from_ids(ids)),
            Repr::Literal(s) if s == UNASSIGNED => Ok(Self::Unassigned),
            Repr::Literal(s) => Err(serde::de::Error::custom(format!(
                "expected a list of staff ids or \"{UNASSIGNED}\", got \"{s}\""
            ))),
        }
    }
}

/// A ranked candidate, as reported in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Staff ID.
    pub staff_id: String,
    /// Suitability score.
    pub score: f64,
}

/// Terminal state of one work unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnitOutcome {
    /// Work-unit ID.
    pub work_unit_id: String,
    /// Owning group.
    pub group: String,
    /// Subject, when subject-level.
    pub subject: Option<String>,
    /// Weekly hours per assignee.
    pub hours: u32,
    /// Whether the unit was flagged critical.
    pub critical: bool,
    /// Who holds the unit.
    pub assignee: Assignee,
    /// Ranked candidates, best first.
    pub candidates: Vec<CandidateScore>,
}

/// Greedy capacity-bounded allocator.
#[derive(Debug, Clone)]
pub struct PrimaryAllocator {
    scorer: CandidateScorer,
    default_quota: usize,
}

impl PrimaryAllocator {
    /// Creates an allocator with a default staff quota per unit.
    pub fn new(default_quota: usize) -> Self {
        Self {
            scorer: CandidateScorer::new(),
            default_quota,
        }
    }

    /// Sets the scorer.
    pub fn with_scorer(mut self, scorer: CandidateScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Allocates every work unit in the index, in input order.
    ///
    /// Returns one outcome per work unit, in the same order.
    pub fn allocate(&self, index: &CapabilityIndex, state: &mut AllocationState) -> Vec<WorkUnitOutcome> {
        index
            .work_units()
            .iter()
            .map(|unit| self.allocate_unit(index, unit, state))
            .collect()
    }

    fn allocate_unit(
        &self,
        index: &CapabilityIndex,
        unit: &WorkUnit,
        state: &mut AllocationState,
    ) -> WorkUnitOutcome {
        let staff = index.staff();
        let qualified = index.qualified(&unit.required_skills);
        let preferred: Vec<usize> = qualified
            .iter()
            .copied()
            .filter(|&i| accepts(&staff[i], unit))
            .collect();
        let pool = if preferred.is_empty() { &qualified } else { &preferred };

        let ranked = self.scorer.rank(staff, pool, &unit.required_skills);
        let quota = match unit.subject.as_deref() {
            Some(subject) if index.catalog().is_specialized(&unit.group, subject) => {
                usize::from(!state.claims.is_claimed(&unit.group, subject))
            }
            _ => unit.staff_quota.unwrap_or(self.default_quota),
        };

        let mut assigned = Vec::new();
        for candidate in &ranked {
            if assigned.len() >= quota {
                break;
            }
            let idx = candidate.staff_idx;
            if !state.ledger.try_commit(idx, unit.hours_per_week) {
                continue;
            }

            let member = &staff[idx];
            state.attachments.attach(idx, &unit.group);
            if let Some(subject) = &unit.subject {
                state.claims.claim(&unit.group, subject, idx);
            }
            state.assignments.push(Assignment {
                staff_id: member.id.clone(),
                group: unit.group.clone(),
                work_unit_id: Some(unit.id.clone()),
                subject: unit.subject.clone(),
                hours: unit.hours_per_week,
                score: candidate.score,
                phase: AllocationPhase::Primary,
            });
            assigned.push(member.id.clone());
        }

        debug!(
            work_unit = %unit.id,
            qualified = qualified.len(),
            preferred = preferred.len(),
            quota,
            assigned = assigned.len(),
            "Allocated work unit"
        );

        WorkUnitOutcome {
            work_unit_id: unit.id.clone(),
            group: unit.group.clone(),
            subject: unit.subject.clone(),
            hours: unit.hours_per_week,
            critical: unit.critical,
            assignee: Assignee::from_ids(assigned),
            candidates: ranked
                .iter()
                .map(|c| CandidateScore {
                    staff_id: staff[c.staff_idx].id.clone(),
                    score: c.score,
                })
                .collect(),
        }
    }
}

/// Whether a staff member's preferences accept a work unit.
fn accepts(staff: &StaffMember, unit: &WorkUnit) -> bool {
    let prefs = &staff.preferences;
    let slot_ok = unit
        .fixed_slot
        .map_or(true, |slot| prefs.allows_day(slot.day) && prefs.allows_start(slot.window.start));

    slot_ok
        && prefs.allows_subject(unit.subject.as_deref())
        && prefs.allows_grade(unit.grade_level.as_deref())
        && prefs.allows_shift(unit.shift.as_deref())
}
