//! Staff-to-work allocation.
//!
//! Two phases share one [`AllocationState`]:
//!
//! 1. [`PrimaryAllocator`]: for each work unit in input order, rank the
//!    qualified staff and walk the ranking, skipping anyone whose cap
//!    cannot absorb the unit's hours, until the unit's quota is filled.
//! 2. [`SaturationBalancer`]: repeatedly tops up staff still below their
//!    cap with one subject from a group they are not yet attached to,
//!    until a pass makes no claim.
//!
//! All hours flow through the [`HourLedger`]. Subject claims are unique
//! per group and never released.
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod ledger;
mod primary;
mod saturation;

pub use ledger::HourLedger;
pub use primary::{Assignee, CandidateScore, PrimaryAllocator, WorkUnitOutcome};
pub use saturation::SaturationBalancer;

use std::collections::{BTreeMap, BTreeSet};

use crate::capability::CapabilityIndex;
use crate::models::{normalize_key, Assignment};

/// Groups each staff member is attached to, by staff position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAttachments {
    groups: Vec<BTreeSet<String>>,
}

impl GroupAttachments {
    /// Creates empty attachments for `staff_count` staff.
    pub fn new(staff_count: usize) -> Self {
        Self {
            groups: vec![BTreeSet::new(); staff_count],
        }
    }

    /// Attaches a staff member to a group.
    pub fn attach(&mut self, idx: usize, group: &str) {
        self.groups[idx].insert(normalize_key(group));
    }

    /// Whether a staff member is attached to a group.
    pub fn is_attached(&self, idx: usize, group: &str) -> bool {
        self.groups[idx].contains(&normalize_key(group))
    }
}

/// Subject claims: one claimant per (group, subject).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectClaims {
    claims: BTreeMap<(String, String), usize>,
}

impl SubjectClaims {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(group: &str, subject: &str) -> (String, String) {
        (normalize_key(group), normalize_key(subject))
    }

    /// Claims a subject. Returns `false` if it is already claimed.
    pub fn claim(&mut self, group: &str, subject: &str, idx: usize) -> bool {
        let key = Self::key(group, subject);
        if self.claims.contains_key(&key) {
            return false;
        }
        self.claims.insert(key, idx);
        true
    }

    /// Whether a subject is claimed in a group.
    pub fn is_claimed(&self, group: &str, subject: &str) -> bool {
        self.claims.contains_key(&Self::key(group, subject))
    }

    /// Staff position holding a claim.
    pub fn claimant(&self, group: &str, subject: &str) -> Option<usize> {
        self.claims.get(&Self::key(group, subject)).copied()
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Mutable state handed from phase to phase during one run.
#[derive(Debug, Clone)]
pub struct AllocationState {
    /// Hour accounting.
    pub ledger: HourLedger,
    /// Group attachments.
    pub attachments: GroupAttachments,
    /// Subject claims.
    pub claims: SubjectClaims,
    /// Assignments in commit order.
    pub assignments: Vec<Assignment>,
}

impl AllocationState {
    /// Opens the state for an index.
    pub fn new(index: &CapabilityIndex) -> Self {
        Self {
            ledger: HourLedger::new(index),
            attachments: GroupAttachments::new(index.staff_count()),
            claims: SubjectClaims::new(),
            assignments: Vec::new(),
        }
    }

    /// Positions of staff holding at least one assignment.
    pub fn assigned_staff(&self, index: &CapabilityIndex) -> BTreeSet<usize> {
        self.assignments
            .iter()
            .filter_map(|a| index.position(&a.staff_id))
            .collect()
    }
}
