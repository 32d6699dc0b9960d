//! Capability error taxonomy
//!
//! | Type | Raised | Surfaces as |
//! |------|--------|-------------|
//! | [`SchemaError`] | schema construction (startup) | aborts registration of that capability |
//! | [`ValidationFailure`] | per call, before execution | `failure` envelope |
//! | [`CapabilityError`] | per call, dispatch or handler | `failure` envelope |
//! | [`RegistryError`] | registration (startup) | registration result |
//!
//! Error codes on [`CapabilityError`] tell the caller whether a corrected
//! call can succeed: `INVALID_ARGUMENT` and `NOT_FOUND` are retryable,
//! everything else is not.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use super::schema::ParameterKind;
use super::value::Value;

/// Malformed schema, detected when the schema is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("capability name cannot be empty")]
    EmptyName,

    #[error("schema '{schema}' contains a parameter with an empty name")]
    EmptyParameterName { schema: String },

    #[error("schema '{schema}' declares parameter '{parameter}' more than once")]
    DuplicateParameter { schema: String, parameter: String },

    #[error("parameter '{parameter}' of type {kind} cannot carry string constraint '{constraint}'")]
    StringConstraintOnNonString {
        parameter: String,
        kind: ParameterKind,
        constraint: &'static str,
    },

    #[error("parameter '{parameter}' of type {kind} cannot carry numeric constraint '{constraint}'")]
    NumericConstraintOnNonNumeric {
        parameter: String,
        kind: ParameterKind,
        constraint: &'static str,
    },

    #[error("parameter '{parameter}' has minLength {min} greater than maxLength {max}")]
    InvertedLength {
        parameter: String,
        min: usize,
        max: usize,
    },

    #[error("parameter '{parameter}' has minimum {min} greater than maximum {max}")]
    InvertedRange { parameter: String, min: f64, max: f64 },

    #[error("parameter '{parameter}' has a non-finite numeric bound")]
    NonFiniteBound { parameter: String },
}

/// Which rule a rejected value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    Missing,
    Type,
    Enum,
    InvalidPattern,
    Pattern,
    MinLength,
    MaxLength,
    Minimum,
    Maximum,
}

/// A single rejected parameter. Display text is the human-readable message.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationFailure {
    /// Offending parameter name
    pub parameter: String,
    /// Rule that was violated
    pub violation: Violation,
    /// Human-readable message, suitable for direct display
    pub message: String,
    /// The rejected value, when one was present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ValidationFailure {
    pub fn new(
        parameter: impl Into<String>,
        violation: Violation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            violation,
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: &Value) -> Self {
        self.value = Some(value.clone());
        self
    }
}

/// Errors reported for a single capability call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityError {
    /// Input did not satisfy the capability's schema
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// Input could not be decoded or was otherwise unusable
    #[error("{0}")]
    InvalidArguments(String),

    /// No capability is registered under the requested name
    #[error("capability '{0}' not found")]
    NotFound(String),

    /// The handler (or a collaborator it called) failed
    #[error("{0}")]
    Execution(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl CapabilityError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidArguments(_) => "INVALID_ARGUMENT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Execution(_) => "EXECUTION_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Timeout(_) => "TIMEOUT",
        }
    }

    /// Whether a caller can fix the call and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidArguments(_) | Self::NotFound(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Registration errors. Both indicate a wiring mistake at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("capability name cannot be empty")]
    EmptyName,

    #[error("capability '{0}' already registered")]
    Duplicate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_display_is_message() {
        assert_eq!(CapabilityError::execution("disk full").to_string(), "disk full");
    }

    #[test]
    fn test_codes_and_retryability() {
        let failure = ValidationFailure::new("name", Violation::Missing, "missing");
        let cases = [
            (CapabilityError::from(failure), "INVALID_ARGUMENT", true),
            (CapabilityError::NotFound("x".into()), "NOT_FOUND", true),
            (CapabilityError::execution("boom"), "EXECUTION_FAILED", false),
            (CapabilityError::Cancelled, "CANCELLED", false),
            (
                CapabilityError::Timeout(Duration::from_millis(5)),
                "TIMEOUT",
                false,
            ),
        ];
        for (error, code, retryable) in cases {
            assert_eq!(error.code(), code);
            assert_eq!(error.is_retryable(), retryable);
        }
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let failure = ValidationFailure::new("port", Violation::Maximum, "too big");
        assert_eq!(CapabilityError::from(failure).to_string(), "too big");
    }

    #[test]
    fn test_timeout_display() {
        let error = CapabilityError::Timeout(Duration::from_millis(1500));
        assert_eq!(error.to_string(), "operation timed out after 1500ms");
    }
}
