use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input failed validation: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, AllocationError>;
