//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine, its store and its configuration can report.

use thiserror::Error;

use crate::models::{LeaveStatus, SurveyCategory};

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use survey_payroll::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "employee",
///     id: "42".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: 42");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up (e.g. "employee").
        entity: &'static str,
        /// The identifier that did not resolve.
        id: String,
    },

    /// A caller-supplied value was malformed or out of range.
    #[error("Invalid input for '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A write would violate a uniqueness invariant.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflicting record.
        message: String,
    },

    /// The operation is not allowed on this record.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Why the operation was refused.
        message: String,
    },

    /// A leave request was decided a second time.
    #[error("Leave request {id} has already been decided ({status})")]
    LeaveAlreadyDecided {
        /// The ID of the leave request.
        id: u64,
        /// The status the request is already in.
        status: LeaveStatus,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No rate is configured for a survey category.
    #[error("Rate not found for survey category '{category}'")]
    RateNotFound {
        /// The category without a rate.
        category: SurveyCategory,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The backing store failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an unknown employee.
    pub fn employee_not_found(user_id: u64) -> Self {
        EngineError::NotFound {
            entity: "employee",
            id: user_id.to_string(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = EngineError::employee_not_found(7);
        assert_eq!(error.to_string(), "employee not found: 7");
    }

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::invalid_input("month", "expected YYYY-MM");
        assert_eq!(
            error.to_string(),
            "Invalid input for 'month': expected YYYY-MM"
        );
    }

    #[test]
    fn test_conflict_displays_message() {
        let error = EngineError::Conflict {
            message: "survey already submitted".to_string(),
        };
        assert_eq!(error.to_string(), "Conflict: survey already submitted");
    }

    #[test]
    fn test_leave_already_decided_displays_status() {
        let error = EngineError::LeaveAlreadyDecided {
            id: 3,
            status: LeaveStatus::Approved,
        };
        assert_eq!(
            error.to_string(),
            "Leave request 3 has already been decided (approved)"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_rate_not_found_displays_category() {
        let error = EngineError::RateNotFound {
            category: SurveyCategory::Dynata,
        };
        assert_eq!(
            error.to_string(),
            "Rate not found for survey category 'dynata'"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_storage_error() -> EngineResult<()> {
            Err(EngineError::Storage {
                message: "offline".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_storage_error()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::Storage { .. })
        ));
    }
}
