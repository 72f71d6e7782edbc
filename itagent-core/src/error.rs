//! Error types for iT-Agent domain operations

use crate::EntityId;
use thiserror::Error;

/// Error when parsing an enumerated value from its string form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {kind}: '{value}' (expected one of: {expected})")]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl EnumParseError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: String::new(),
        }
    }

    /// Attach the list of accepted values for a friendlier message.
    pub fn with_expected<T: std::fmt::Display>(mut self, accepted: &[T]) -> Self {
        self.expected = accepted
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self
    }
}

/// Validation errors raised by domain rules.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("Circular reference detected in task hierarchy: {ids:?}")]
    CircularReference { ids: Vec<EntityId> },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<EnumParseError> for ValidationError {
    fn from(err: EnumParseError) -> Self {
        Self::InvalidValue {
            field: err.kind.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result alias for domain validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
