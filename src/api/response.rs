//! Response types for the payroll API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API, plus the small response bodies that are not domain
//! models themselves.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::Month;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::NotFound { entity, id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "NOT_FOUND",
                    message,
                    format!("No {} exists with id {}", entity, id),
                ),
            },
            EngineError::InvalidInput { field, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details("INVALID_INPUT", message, field),
            },
            EngineError::Conflict { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("CONFLICT", message),
            },
            EngineError::Forbidden { .. } => ApiErrorResponse {
                status: StatusCode::FORBIDDEN,
                error: ApiError::new("FORBIDDEN", message),
            },
            EngineError::LeaveAlreadyDecided { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "LEAVE_ALREADY_DECIDED",
                    message,
                    "A leave request can only be decided while it is pending",
                ),
            },
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::RateNotFound { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("RATE_NOT_FOUND", "Configuration error", message),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
            EngineError::Storage { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            },
        }
    }
}

/// Body of `GET /leave-days/:user_id/:month`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDaysResponse {
    /// The employee.
    pub user_id: u64,
    /// The month counted.
    pub month: Month,
    /// Approved leave days inside the month.
    pub leave_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaveStatus;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let api_error: ApiErrorResponse = EngineError::employee_not_found(9).into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.error.code, "NOT_FOUND");
    }

    #[test]
    fn test_invalid_input_names_field() {
        let api_error: ApiErrorResponse =
            EngineError::invalid_input("month", "expected YYYY-MM").into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.details.as_deref(), Some("month"));
    }

    #[test]
    fn test_conflicts_map_to_409() {
        let conflict: ApiErrorResponse = EngineError::Conflict {
            message: "duplicate".to_string(),
        }
        .into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let decided: ApiErrorResponse = EngineError::LeaveAlreadyDecided {
            id: 1,
            status: LeaveStatus::Rejected,
        }
        .into();
        assert_eq!(decided.status, StatusCode::CONFLICT);
        assert_eq!(decided.error.code, "LEAVE_ALREADY_DECIDED");
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let api_error: ApiErrorResponse = EngineError::Forbidden {
            message: "admins cannot be deleted".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::FORBIDDEN);
        assert_eq!(api_error.error.code, "FORBIDDEN");
    }

    #[test]
    fn test_storage_maps_to_500() {
        let api_error: ApiErrorResponse = EngineError::Storage {
            message: "down".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "STORAGE_ERROR");
    }
}
