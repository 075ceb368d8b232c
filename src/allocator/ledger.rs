//! Per-staff weekly hour accounting.

use serde::Serialize;

use crate::capability::CapabilityIndex;

/// Accumulated weekly hours per staff member, indexed by staff position.
///
/// The only place hours are added during a run. Every commit checks the
/// effective cap first, so `accumulated(i) <= cap(i)` holds whenever it
/// held at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourLedger {
    committed: Vec<u32>,
    accumulated: Vec<u32>,
    caps: Vec<u32>,
}

impl HourLedger {
    /// Opens a ledger: every staff member starts at their committed
    /// (administrative + extracurricular) hours.
    pub fn new(index: &CapabilityIndex) -> Self {
        let committed: Vec<u32> = index.staff().iter().map(|s| s.committed_hours()).collect();
        Self {
            accumulated: committed.clone(),
            caps: (0..index.staff_count()).map(|i| index.cap(i)).collect(),
            committed,
        }
    }

    /// Number of staff tracked.
    pub fn len(&self) -> usize {
        self.accumulated.len()
    }

    /// Whether the ledger tracks no staff.
    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

    /// Total accumulated hours (committed + assigned).
    pub fn accumulated(&self, idx: usize) -> u32 {
        self.accumulated[idx]
    }

    /// Hours assigned during this run.
    pub fn assigned(&self, idx: usize) -> u32 {
        self.accumulated[idx].saturating_sub(self.committed[idx])
    }

    /// Hours committed before the run.
    pub fn committed(&self, idx: usize) -> u32 {
        self.committed[idx]
    }

    /// Effective weekly cap.
    pub fn cap(&self, idx: usize) -> u32 {
        self.caps[idx]
    }

    /// Hours left before the cap.
    pub fn remaining(&self, idx: usize) -> u32 {
        self.caps[idx].saturating_sub(self.accumulated[idx])
    }

    /// Whether the staff member is strictly below the cap.
    pub fn is_under_cap(&self, idx: usize) -> bool {
        self.accumulated[idx] < self.caps[idx]
    }

    /// Whether `hours` more would still fit under the cap.
    pub fn can_absorb(&self, idx: usize, hours: u32) -> bool {
        self.accumulated[idx]
            .checked_add(hours)
            .is_some_and(|total| total <= self.caps[idx])
    }

    /// Adds `hours` if they fit. Returns whether the commit happened.
    pub fn try_commit(&mut self, idx: usize, hours: u32) -> bool {
        if !self.can_absorb(idx, hours) {
            return false;
        }
        self.accumulated[idx] += hours;
        true
    }
}
