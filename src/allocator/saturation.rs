//! Saturation balancing: top up under-utilized staff with subject work.
//!
//! # Algorithm
//!
//! ```text
//! repeat
//!   progressed = false
//!   for each available staff member below cap (visiting order):
//!     for each group the member is not attached to:
//!       for each subject, specialized first, then core:
//!         if member covers the subject's skills
//!            and the subject is unclaimed in the group
//!            and the hours fit under the cap:
//!           claim, attach, commit hours; progressed = true
//!           next staff member
//! until not progressed
//! ```
//!
//! Visiting order is by score against every skill the catalog requires,
//! descending, ties in input order.
//!
//! # Termination
//! Every productive pass adds at least one claim, and claims are unique
//! per (group, subject) and never released, so there are at most
//! `Σ subjects` productive passes. The loop is additionally capped at
//! `staff · groups · subjects + 1` passes.

use tracing::{debug, warn};

use super::AllocationState;
use crate::capability::CapabilityIndex;
use crate::models::{AllocationPhase, Assignment};
use crate::scoring::CandidateScorer;

/// Fixed-point subject top-up.
#[derive(Debug, Clone, Default)]
pub struct SaturationBalancer {
    scorer: CandidateScorer,
}

impl SaturationBalancer {
    /// Creates a balancer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scorer used for the visiting order.
    pub fn with_scorer(mut self, scorer: CandidateScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Runs to a fixed point. Returns the number of claims made.
    pub fn balance(&self, index: &CapabilityIndex, state: &mut AllocationState) -> usize {
        let catalog = index.catalog();
        let staff = index.staff();
        let available: Vec<usize> = (0..staff.len()).filter(|&i| index.is_available(i)).collect();
        let order = self
            .scorer
            .rank(staff, &available, &catalog.all_required_skills());

        let max_passes = staff
            .len()
            .saturating_mul(catalog.group_count())
            .saturating_mul(catalog.subject_count())
            .saturating_add(1);

        let mut claims = 0;
        let mut passes = 0;
        loop {
            passes += 1;
            let mut progressed = false;

            for candidate in &order {
                let idx = candidate.staff_idx;
                if !state.ledger.is_under_cap(idx) {
                    continue;
                }
                let member = &staff[idx];

                'groups: for group in &catalog.groups {
                    if state.attachments.is_attached(idx, &group.group) {
                        continue;
                    }
                    for (_, subject) in group.subjects_in_claim_order() {
                        if !member.covers(&subject.required_skills)
                            || state.claims.is_claimed(&group.group, &subject.name)
                            || !state.ledger.try_commit(idx, subject.hours_per_week)
                        {
                            continue;
                        }

                        state.claims.claim(&group.group, &subject.name, idx);
                        state.attachments.attach(idx, &group.group);
                        state.assignments.push(Assignment {
                            staff_id: member.id.clone(),
                            group: group.group.clone(),
                            work_unit_id: None,
                            subject: Some(subject.name.clone()),
                            hours: subject.hours_per_week,
                            score: self.scorer.score(member, &subject.required_skills),
                            phase: AllocationPhase::Saturation,
                        });
                        claims += 1;
                        progressed = true;
                        break 'groups;
                    }
                }
            }

            debug!(pass = passes, total_claims = claims, progressed, "Saturation pass");

            if !progressed {
                break;
            }
            if passes >= max_passes {
                warn!(passes, "Saturation stopped at the pass limit");
                break;
            }
        }
        claims
    }
}
