//! Workforce allocation for the U-Engine ecosystem.
//!
//! Assigns staff to required work under skill, capacity and preference
//! constraints, tops up under-utilized staff with curriculum subjects,
//! and places the resulting work on a weekly timetable.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `StaffMember`, `WorkUnit`, `CurriculumCatalog`,
//!   `Constraints`, `Assignment`, `ScheduleEntry`, `Schedule`
//! - **`input`**: Lenient raw records and JSON request loading
//! - **`capability`**: Normalization and the capability index
//! - **`scoring`**: Candidate suitability scoring
//! - **`allocator`**: Hour ledger, primary allocation, saturation balancing
//! - **`scheduler`**: Feasibility predicate and grid slot scheduler
//! - **`summary`**: Per-staff, per-group and run-wide summaries
//! - **`validation`**: Input integrity checks (duplicate IDs, invalid constraints)
//! - **`engine`**: The `allocate` operation
//!
//! # Architecture
//!
//! A single-threaded batch computation over one input snapshot. Phases
//! run in order (index → primary → saturation → scheduling → summary);
//! the only mutable shared resource is the per-staff hour ledger.
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4

pub mod allocator;
pub mod capability;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod models;
pub mod scheduler;
pub mod scoring;
pub mod summary;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{allocate, AllocationResult, Engine};
pub use error::{AllocationError, Result};
