//! The allocation engine.
//!
//! One synchronous operation: staff, work units, constraints and
//! preferences in; a self-contained result record out. Phases run in a
//! fixed order over a single input snapshot:
//!
//! ```text
//! CapabilityIndex → validation → PrimaryAllocator → SaturationBalancer
//!                 → SlotScheduler → summarize
//! ```
//!
//! The run performs no I/O and keeps no state between calls.
//!
//! # Example
//!
//! ```
//! use u_workforce::engine::allocate;
//! use u_workforce::models::{Constraints, StaffMember, WorkUnit};
//!
//! let staff = vec![StaffMember::new("T1").with_skill("Mathematics")];
//! let units = vec![WorkUnit::new("U1", "STEM").with_required_skill("Mathematics").with_hours(4)];
//!
//! let result = allocate(staff, units, Constraints::default(), &[]).unwrap();
//! assert_eq!(result.work_units[0].assignee.staff_ids(), ["T1"]);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::allocator::{AllocationState, PrimaryAllocator, SaturationBalancer, WorkUnitOutcome};
use crate::capability::{normalize_request, CapabilityIndex, NormalizedInput};
use crate::config::EngineConfig;
use crate::error::{AllocationError, Result};
use crate::input::AllocationRequest;
use crate::models::{
    Assignment, Constraints, CurriculumCatalog, Schedule, StaffMember, StaffPreference, WorkUnit,
};
use crate::scheduler::SlotScheduler;
use crate::scoring::CandidateScorer;
use crate::summary::{summarize, AllocationStatistics, GroupSummary, StaffSummary};
use crate::validation::validate_input;

/// Result of one allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Per-staff summaries, in input order.
    pub staff: Vec<StaffSummary>,
    /// Staff with no assignment.
    pub unassigned_staff: Vec<String>,
    /// One outcome per work unit, in input order.
    pub work_units: Vec<WorkUnitOutcome>,
    /// Every assignment, in commit order.
    pub assignments: Vec<Assignment>,
    /// Weekly schedule.
    pub schedule: Schedule,
    /// Per-group summaries.
    pub groups: Vec<GroupSummary>,
    /// Run-wide statistics.
    pub statistics: AllocationStatistics,
}

/// Allocates with the default engine (senior-high catalog, default
/// configuration).
pub fn allocate(
    staff: Vec<StaffMember>,
    work_units: Vec<WorkUnit>,
    constraints: Constraints,
    preferences: &[StaffPreference],
) -> Result<AllocationResult> {
    Engine::default().allocate(staff, work_units, constraints, preferences)
}

/// Allocation engine: configuration, curriculum catalog and scorer.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    catalog: CurriculumCatalog,
    scorer: CandidateScorer,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine with the senior-high catalog sized by
    /// `config.default_subject_hours`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            catalog: CurriculumCatalog::senior_high(config.default_subject_hours),
            config,
            scorer: CandidateScorer::new(),
        }
    }

    /// Replaces the curriculum catalog.
    pub fn with_catalog(mut self, catalog: CurriculumCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the scorer.
    pub fn with_scorer(mut self, scorer: CandidateScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Curriculum catalog.
    pub fn catalog(&self) -> &CurriculumCatalog {
        &self.catalog
    }

    /// Runs an allocation over typed input.
    pub fn allocate(
        &self,
        staff: Vec<StaffMember>,
        work_units: Vec<WorkUnit>,
        constraints: Constraints,
        preferences: &[StaffPreference],
    ) -> Result<AllocationResult> {
        self.run(staff, work_units, constraints, preferences, self.catalog.clone())
    }

    /// Runs an allocation over normalized input; its catalog, if any,
    /// replaces the engine's for this run.
    pub fn allocate_input(&self, input: NormalizedInput) -> Result<AllocationResult> {
        let catalog = input.catalog.unwrap_or_else(|| self.catalog.clone());
        self.run(
            input.staff,
            input.work_units,
            input.constraints,
            &input.preferences,
            catalog,
        )
    }

    /// Runs an allocation over a raw request.
    pub fn allocate_request(&self, request: &AllocationRequest) -> Result<AllocationResult> {
        self.allocate_input(normalize_request(request, &self.config)?)
    }

    /// Parses a JSON request and runs it.
    pub fn allocate_json(&self, json: &str) -> Result<AllocationResult> {
        self.allocate_request(&AllocationRequest::from_json(json)?)
    }

    fn run(
        &self,
        staff: Vec<StaffMember>,
        work_units: Vec<WorkUnit>,
        constraints: Constraints,
        preferences: &[StaffPreference],
        catalog: CurriculumCatalog,
    ) -> Result<AllocationResult> {
        self.config.validate()?;

        let span = info_span!("allocate", staff = staff.len(), work_units = work_units.len());
        let _guard = span.enter();

        let index = CapabilityIndex::build(staff, work_units, constraints, preferences, catalog);
        validate_input(index.staff(), index.work_units(), index.constraints())
            .map_err(AllocationError::Validation)?;

        let mut state = AllocationState::new(&index);
        let outcomes = PrimaryAllocator::new(self.config.default_staff_quota)
            .with_scorer(self.scorer)
            .allocate(&index, &mut state);
        let claims = SaturationBalancer::new()
            .with_scorer(self.scorer)
            .balance(&index, &mut state);

        let schedule = SlotScheduler::from_config(&self.config).schedule(&index, &state.assignments);
        let summary = summarize(&index, &state.assignments, &outcomes, &schedule);

        info!(
            assignments = state.assignments.len(),
            saturation_claims = claims,
            unassigned_work_units = summary.statistics.unassigned_work_units,
            scheduled = schedule.entry_count(),
            unscheduled = schedule.unscheduled.len(),
            "Allocation complete"
        );

        Ok(AllocationResult {
            staff: summary.staff,
            unassigned_staff: summary.unassigned_staff,
            work_units: outcomes,
            assignments: state.assignments,
            schedule,
            groups: summary.groups,
            statistics: summary.statistics,
        })
    }
}
