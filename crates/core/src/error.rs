//! Error types for ormeta
//!
//! This module provides unified error handling across the workspace:
//! relationship configuration errors raised while building descriptors,
//! unsupported column types reported by dialects, and configuration
//! loading errors.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ormeta
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Descriptor Construction Errors
    // ========================================================================
    /// One or more relationship fields carry contradictory key annotations.
    ///
    /// The descriptor is still built and cached; the registry hands out the
    /// partial descriptor on request.
    #[error("Invalid relationship configuration on '{model}': {}", join_issues(.issues))]
    Configuration {
        model: String,
        issues: Vec<ConfigIssue>,
    },

    /// A dialect has no column representation for a field's type
    #[error("Unsupported type {field_type} for field '{field}' in {dialect}")]
    UnsupportedType {
        dialect: String,
        field: String,
        field_type: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a configuration error for a model
    pub fn configuration(model: impl Into<String>, issues: Vec<ConfigIssue>) -> Self {
        EngineError::Configuration {
            model: model.into(),
            issues,
        }
    }

    /// Create an unsupported type error
    pub fn unsupported_type(
        dialect: impl Into<String>,
        field: impl Into<String>,
        field_type: impl fmt::Display,
    ) -> Self {
        EngineError::UnsupportedType {
            dialect: dialect.into(),
            field: field.into(),
            field_type: field_type.to_string(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfig(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Check if this error is a relationship configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration { .. })
    }

    /// Check if this error is an unsupported column type
    pub fn is_unsupported(&self) -> bool {
        matches!(self, EngineError::UnsupportedType { .. })
    }

    /// Issues carried by a configuration error (empty for other errors)
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            EngineError::Configuration { issues, .. } => issues,
            _ => &[],
        }
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// Configuration Issues
// ============================================================================

/// A single misconfigured relationship field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    /// Declared name of the offending field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl ConfigIssue {
    /// Create a new issue
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let err = EngineError::configuration(
            "Owner",
            vec![ConfigIssue::new(
                "Children",
                "invalid foreign keys, should have same length",
            )],
        );
        assert!(err.is_configuration());
        assert!(!err.is_unsupported());
        assert_eq!(err.issues().len(), 1);
        assert_eq!(
            err.to_string(),
            "Invalid relationship configuration on 'Owner': Children: invalid foreign keys, should have same length"
        );
    }

    #[test]
    fn test_configuration_error_joins_issues() {
        let err = EngineError::configuration(
            "Owner",
            vec![ConfigIssue::new("A", "first"), ConfigIssue::new("B", "second")],
        );
        assert_eq!(
            err.to_string(),
            "Invalid relationship configuration on 'Owner': A: first; B: second"
        );
    }

    #[test]
    fn test_unsupported_type_error() {
        let err = EngineError::unsupported_type("postgres", "Meta", "HashMap<String, i32>");
        assert!(err.is_unsupported());
        assert!(err.issues().is_empty());
        assert_eq!(
            err.to_string(),
            "Unsupported type HashMap<String, i32> for field 'Meta' in postgres"
        );
    }

    #[test]
    fn test_invalid_config_error() {
        let err = EngineError::invalid_config("unknown field `plural`");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: unknown field `plural`"
        );
    }
}
