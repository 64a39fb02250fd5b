//! Error taxonomy.
//!
//! The core raises exactly two conditions. Empty inputs are no-ops, not
//! errors; storage and transport failures belong to the caller.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by grouping and scheduling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Malformed work item data (negative or non-finite effort, bad ids,
    /// dangling group members).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Malformed configuration (buffer ratio, limits, horizon, workdays).
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PlanError>;

impl From<Vec<ValidationError>> for PlanError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        PlanError::InvalidInput(message)
    }
}
