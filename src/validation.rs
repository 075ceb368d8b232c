//! Input validation for allocation runs.
//!
//! Checks the structural integrity that the allocation phases rely on.
//! Detects:
//! - Empty or duplicate staff IDs (hour budgets are keyed by ID)
//! - Empty or duplicate work-unit IDs (every unit must be reported once)
//! - A non-positive weekly hour ceiling
//! - A negative minimum rest period
//!
//! Everything else (missing skills, caps, preferences) is absorbed by
//! defaults and never reported here.

use std::collections::HashSet;
use std::fmt;

use crate::models::{Constraints, StaffMember, WorkUnit};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An entity has a blank ID.
    EmptyId,
    /// The weekly hour ceiling is zero.
    InvalidHourCeiling,
    /// The minimum rest period is negative or not a number.
    InvalidRestPeriod,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the input of an allocation run.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    staff: &[StaffMember],
    work_units: &[WorkUnit],
    constraints: &Constraints,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut staff_ids = HashSet::new();
    for (i, s) in staff.iter().enumerate() {
        if s.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Staff record {i} has an empty ID"),
            ));
        } else if !staff_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate staff ID: {}", s.id),
            ));
        }
    }

    let mut unit_ids = HashSet::new();
    for (i, u) in work_units.iter().enumerate() {
        if u.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Work unit {i} has an empty ID"),
            ));
        } else if !unit_ids.insert(u.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate work unit ID: {}", u.id),
            ));
        }
    }

    if constraints.max_hours_per_week == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidHourCeiling,
            "max_hours_per_week must be positive",
        ));
    }

    if constraints.min_rest_hours.is_nan() || constraints.min_rest_hours < 0.0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRestPeriod,
            format!(
                "min_rest_hours must be non-negative, got {}",
                constraints.min_rest_hours
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
