//! Validation errors shared by every Somnair crate.

use thiserror::Error;

/// Errors raised when caller-supplied values cannot be accepted.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A required field was not supplied.
    #[error("missing required field '{field}'")]
    Missing { field: String },

    /// A field could not be interpreted as a real number.
    #[error("field '{field}' must be a number, got {value}")]
    NotANumber { field: String, value: String },

    /// A numeric field was NaN or infinite.
    #[error("field '{field}' must be a finite number")]
    NonFinite { field: String },

    /// A numeric field was below zero.
    #[error("field '{field}' must not be negative, got {value}")]
    Negative { field: String, value: f64 },

    /// A text field was empty after trimming.
    #[error("field '{field}' must not be empty")]
    Empty { field: String },

    /// A field had the wrong JSON type, e.g. an object where a number belongs.
    #[error("field '{field}' must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::NonFinite { field }
            | ValidationError::Negative { field, .. }
            | ValidationError::Empty { field }
            | ValidationError::InvalidType { field, .. } => field,
        }
    }
}

/// Result type alias using [`ValidationError`].
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
