//! Candidate suitability scoring.
//!
//! ```text
//! score = w_overlap · |R ∩ S|
//!       + w_depth   · Σ_{s ∈ R ∩ S} proficiency(s)
//!       + w_tenure  · years
//! ```
//!
//! where `R` is the required skill set and `S` the staff member's skills.
//! Default weights are 1.0 / 2.0 / 0.3: breadth of overlap first, then
//! depth, then tenure. Certifications make a staff member a candidate
//! but do not add to the score.
//!
//! # Ordering
//! Ranking is a stable descending sort, so among equal scores the staff
//! member seen first in input order wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::StaffMember;

/// A scored candidate: staff position plus score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Position of the staff member in input order.
    pub staff_idx: usize,
    /// Suitability score.
    pub score: f64,
}

/// Weighted suitability scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScorer {
    /// Weight per overlapping skill.
    pub overlap_weight: f64,
    /// Weight per proficiency ordinal of overlapping skills.
    pub proficiency_weight: f64,
    /// Weight per year of experience.
    pub experience_weight: f64,
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self {
            overlap_weight: 1.0,
            proficiency_weight: 2.0,
            experience_weight: 0.3,
        }
    }
}

impl CandidateScorer {
    /// Creates a scorer with the default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the experience weight.
    pub fn with_experience_weight(mut self, weight: f64) -> Self {
        self.experience_weight = weight;
        self
    }

    /// Scores a staff member against a required skill set.
    pub fn score(&self, staff: &StaffMember, required: &BTreeSet<String>) -> f64 {
        let (overlap, depth) = required
            .iter()
            .filter(|skill| staff.has_skill(skill))
            .fold((0u32, 0u32), |(n, d), skill| {
                (n + 1, d + u32::from(staff.proficiency_of(skill)))
            });

        self.overlap_weight * f64::from(overlap)
            + self.proficiency_weight * f64::from(depth)
            + self.experience_weight * staff.years_experience
    }

    /// Scores and ranks candidates, best first.
    ///
    /// `candidates` are positions into `staff`; their order is the
    /// tie-break order.
    pub fn rank(
        &self,
        staff: &[StaffMember],
        candidates: &[usize],
        required: &BTreeSet<String>,
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|&staff_idx| ScoredCandidate {
                staff_idx,
                score: self.score(&staff[staff_idx], required),
            })
            .collect();
        // sort_by is stable
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProficiencyLevel;

    fn required(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_score_formula() {
        let s = StaffMember::new("T1")
            .with_skill_level("Math", ProficiencyLevel::Intermediate)
            .with_skill_level("Physics", ProficiencyLevel::Expert)
            .with_skill("Art")
            .with_experience(10.0);
        let scorer = CandidateScorer::new();

        // overlap 2, depth 2 + 4, tenure 10
        let score = scorer.score(&s, &required(&["math", "physics", "chemistry"]));
        assert!((score - (2.0 + 2.0 * 6.0 + 3.0)).abs() < 1e-10);
    }

    #[test]
    fn test_certification_does_not_score() {
        let s = StaffMember::new("T1").with_certification("Math");
        let score = CandidateScorer::new().score(&s, &required(&["math"]));
        assert!(score.abs() < 1e-10);
    }

    #[test]
    fn test_experience_alone_cannot_outrank_skill() {
        let skilled = StaffMember::new("A").with_skill_level("Math", ProficiencyLevel::Beginner);
        let veteran = StaffMember::new("B").with_experience(9.0);
        let scorer = CandidateScorer::new();
        let req = required(&["math"]);
        assert!(scorer.score(&skilled, &req) > scorer.score(&veteran, &req));
    }

    #[test]
    fn test_rank_descending_and_stable() {
        let staff = vec![
            StaffMember::new("A").with_skill("Math"),
            StaffMember::new("B").with_skill_level("Math", ProficiencyLevel::Expert),
            StaffMember::new("C").with_skill("Math"),
        ];
        let ranked = CandidateScorer::new().rank(&staff, &[0, 1, 2], &required(&["math"]));
        let order: Vec<usize> = ranked.iter().map(|c| c.staff_idx).collect();
        assert_eq!(order, vec![1, 0, 2]);

        // Candidate order is the tie-break order.
        let ranked = CandidateScorer::new().rank(&staff, &[2, 0], &required(&["math"]));
        let order: Vec<usize> = ranked.iter().map(|c| c.staff_idx).collect();
        assert_eq!(order, vec![2, 0]);
    }

    #[test]
    fn test_scenario_a_scores() {
        let alice = StaffMember::new("Alice").with_skill_level("math", ProficiencyLevel::Intermediate);
        let bob = StaffMember::new("Bob").with_skill_level("math", ProficiencyLevel::Beginner);
        let scorer = CandidateScorer::new();
        let req = required(&["math"]);
        assert!((scorer.score(&alice, &req) - 5.0).abs() < 1e-10);
        assert!((scorer.score(&bob, &req) - 3.0).abs() < 1e-10);
    }
}
