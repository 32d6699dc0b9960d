//! Configuration issues.
//!
//! Configuration checks collect every problem they find instead of stopping
//! at the first one. Each problem is a [`ConfigIssue`] with a severity:
//! errors disable the affected entry, warnings are only reported.

use serde::Serialize;
use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fatal for the affected entry: it is skipped.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigIssueCode {
    /// A command capability has an empty command template.
    EmptyCommand,
    /// A parameter declares a type that does not exist.
    UnknownParameterType,
    /// The parameter list does not form a valid schema.
    InvalidSchema,
    /// The template references `{name}` but no parameter of that name exists.
    UndeclaredPlaceholder,
    /// A declared parameter never appears in the template.
    UnusedParameter,
    /// A configured capability has the same name as a built-in one.
    ShadowsBuiltin,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        assert!(ConfigIssue::error(ConfigIssueCode::EmptyCommand, "x").is_error());
        assert!(!ConfigIssue::warning(ConfigIssueCode::UnusedParameter, "x").is_error());
    }

    #[test]
    fn test_display() {
        let issue = ConfigIssue::warning(ConfigIssueCode::UnusedParameter, "parameter 'x' is never used");
        assert_eq!(issue.to_string(), "warning: parameter 'x' is never used");
    }
}
