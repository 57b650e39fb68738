//! Medication domain error types

use thiserror::Error;

/// Errors raised by the medication store and schedule evaluator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MedicationError {
    /// No medication with this id
    #[error("Medication not found: {0}")]
    NotFound(String),

    /// A medication with this id already exists
    #[error("Duplicate medication id: {0}")]
    DuplicateId(String),

    /// The record breaks an invariant
    #[error("Invalid medication: {0}")]
    Invalid(String),
}

/// Result type alias for medication operations
pub type MedicationResult<T> = Result<T, MedicationError>;
