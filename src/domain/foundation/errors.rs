//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i32,
        max: i32,
        actual: i32,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i32, max: i32, actual: i32) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_formats_message() {
        let err = ValidationError::empty_field("language");
        assert_eq!(err.to_string(), "Field 'language' cannot be empty");
    }

    #[test]
    fn out_of_range_formats_message() {
        let err = ValidationError::out_of_range("max_iterations", 1, 100, 0);
        assert_eq!(
            err.to_string(),
            "Field 'max_iterations' must be between 1 and 100, got 0"
        );
    }

    #[test]
    fn invalid_format_formats_message() {
        let err = ValidationError::invalid_format("grounding_mode", "unknown variant 'extreme'");
        assert_eq!(
            err.to_string(),
            "Field 'grounding_mode' has invalid format: unknown variant 'extreme'"
        );
    }
}
