//! API failures.
//!
//! Services and handlers return [`ApiResult`]. An [`ApiError`] renders as
//! `{"success": false, "error": "...", "code": "...", "details": ...}` with
//! the HTTP status implied by its [`ErrorCode`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use itagent_core::{EnumParseError, ValidationError};
use itagent_storage::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable failure kind, serialized SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // --- 401 / 403 ---
    /// Missing credentials
    Unauthorized,

    /// Caller does not own the resource
    Forbidden,

    /// Token could not be verified
    InvalidToken,

    /// Token is past its expiry
    TokenExpired,

    /// Permission policy denied a tool call
    ToolPermissionDenied,

    // --- 400 ---
    ValidationFailed,
    InvalidInput,
    MissingField,
    InvalidRange,
    InvalidFormat,

    /// Tool call parameters do not satisfy the tool's schema
    ToolParameterInvalid,

    // --- 404 ---
    EntityNotFound,
    SessionNotFound,
    TaskNotFound,
    ToolNotFound,
    ToolLogNotFound,
    TeamNotFound,
    TeamMemberNotFound,
    TemplateNotFound,
    CapabilityNotFound,
    InteractionNotFound,
    AgentConfigNotFound,

    // --- 408 ---
    /// The request ran past the configured timeout
    RequestTimeout,

    // --- 409 ---
    EntityAlreadyExists,
    StateConflict,

    // --- 500 ---
    InternalError,

    /// A tool handler failed or no handler is registered
    ToolExecutionFailed,

    /// Repository lock poisoned
    StorageError,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::Forbidden | ErrorCode::ToolPermissionDenied => StatusCode::FORBIDDEN,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange
            | ErrorCode::InvalidFormat
            | ErrorCode::ToolParameterInvalid => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound
            | ErrorCode::SessionNotFound
            | ErrorCode::TaskNotFound
            | ErrorCode::ToolNotFound
            | ErrorCode::ToolLogNotFound
            | ErrorCode::TeamNotFound
            | ErrorCode::TeamMemberNotFound
            | ErrorCode::TemplateNotFound
            | ErrorCode::CapabilityNotFound
            | ErrorCode::InteractionNotFound
            | ErrorCode::AgentConfigNotFound => StatusCode::NOT_FOUND,

            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,

            ErrorCode::EntityAlreadyExists | ErrorCode::StateConflict => StatusCode::CONFLICT,

            ErrorCode::InternalError
            | ErrorCode::ToolExecutionFailed
            | ErrorCode::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message used by [`ApiError::from_code`].
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::Forbidden => "Caller may not access this resource",
            ErrorCode::InvalidToken => "Bearer token could not be verified",
            ErrorCode::TokenExpired => "Bearer token has expired",
            ErrorCode::ToolPermissionDenied => "Tool access denied",

            ErrorCode::ValidationFailed => "Request is invalid",
            ErrorCode::InvalidInput => "Request body could not be read",
            ErrorCode::MissingField => "A required field is missing",
            ErrorCode::InvalidRange => "Value is outside the allowed range",
            ErrorCode::InvalidFormat => "Value is malformed",
            ErrorCode::ToolParameterInvalid => "Invalid tool parameters",

            ErrorCode::EntityNotFound => "Resource not found",
            ErrorCode::SessionNotFound => "Session not found",
            ErrorCode::TaskNotFound => "Task not found",
            ErrorCode::ToolNotFound => "Tool not found",
            ErrorCode::ToolLogNotFound => "Tool log not found",
            ErrorCode::TeamNotFound => "Team not found",
            ErrorCode::TeamMemberNotFound => "Team member not found",
            ErrorCode::TemplateNotFound => "Template not found",
            ErrorCode::CapabilityNotFound => "Capability not found",
            ErrorCode::InteractionNotFound => "Interaction not found",
            ErrorCode::AgentConfigNotFound => "Agent config not found",

            ErrorCode::RequestTimeout => "Request timed out",

            ErrorCode::EntityAlreadyExists => "Resource already exists",
            ErrorCode::StateConflict => "Resource is in a conflicting state",

            ErrorCode::InternalError => "Unexpected server failure",
            ErrorCode::ToolExecutionFailed => "Tool execution failed",
            ErrorCode::StorageError => "Storage operation failed",
        }
    }

    /// Entity-specific not-found code for a storage entity name.
    fn not_found_for(entity: &str) -> Self {
        match entity {
            "Session" => ErrorCode::SessionNotFound,
            "Task" => ErrorCode::TaskNotFound,
            "Tool" => ErrorCode::ToolNotFound,
            "Tool log" => ErrorCode::ToolLogNotFound,
            "Team" => ErrorCode::TeamNotFound,
            "Template" => ErrorCode::TemplateNotFound,
            "Capability" => ErrorCode::CapabilityNotFound,
            "Agent config" => ErrorCode::AgentConfigNotFound,
            _ => ErrorCode::EntityNotFound,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Structured error returned by every handler and service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Field errors or schema violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// `Required field '<field>' is missing`.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn invalid_range(field: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("'{}' must lie between {} and {}", field, min, max),
        )
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("'{}' is malformed; expected {}", field, expected),
        )
    }

    pub fn entity_already_exists(entity: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityAlreadyExists,
            format!("{} '{}' already exists", entity, id),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn tool_permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ToolPermissionDenied, message)
    }

    pub fn tool_parameter_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ToolParameterInvalid, message)
    }

    pub fn tool_execution_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ToolExecutionFailed, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Wire shape of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    pub error: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl From<ApiError> for ErrorEnvelope {
    fn from(err: ApiError) -> Self {
        Self {
            success: false,
            error: err.message,
            code: err.code,
            details: err.details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
        } else {
            tracing::debug!(code = %self.code, message = %self.message, "request rejected");
        }
        (status, Json(ErrorEnvelope::from(self))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, .. } => {
                ApiError::new(ErrorCode::not_found_for(entity), format!("{} not found", entity))
            }
            StorageError::AlreadyExists { entity, id } => {
                ApiError::entity_already_exists(entity, id)
            }
            StorageError::LockPoisoned => {
                tracing::error!(error = %err, "repository unavailable");
                ApiError::from_code(ErrorCode::StorageError)
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::RequiredFieldMissing { .. } => ErrorCode::MissingField,
            ValidationError::OutOfRange { .. } => ErrorCode::InvalidRange,
            ValidationError::InvalidValue { .. } | ValidationError::CircularReference { .. } => {
                ErrorCode::ValidationFailed
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<EnumParseError> for ApiError {
    fn from(err: EnumParseError) -> Self {
        ApiError::validation_failed(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_input(format!("JSON could not be processed: {}", err))
    }
}

impl From<uuid::Error> for ApiError {
    fn from(err: uuid::Error) -> Self {
        ApiError::invalid_format("id", &format!("a UUID ({})", err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ToolPermissionDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ToolParameterInvalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::TeamNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::StateConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::RequestTimeout.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            ErrorCode::ToolExecutionFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_not_found_uses_entity_code() {
        let err = ApiError::from(StorageError::NotFound {
            entity: "Tool log",
            id: "x".to_string(),
        });
        assert_eq!(err.code, ErrorCode::ToolLogNotFound);
        assert_eq!(err.message, "Tool log not found");
    }

    #[test]
    fn test_lock_poisoned_is_server_error() {
        let err = ApiError::from(StorageError::LockPoisoned);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_mapping() {
        let err = ApiError::from(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
        assert_eq!(err.code, ErrorCode::InvalidRange);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_envelope_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::validation_failed("Session name cannot be empty")
            .with_details(serde_json::json!({"field": "name"}));
        let json = serde_json::to_value(ErrorEnvelope::from(err))?;

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Session name cannot be empty");
        assert_eq!(json["code"], "VALIDATION_FAILED");
        assert_eq!(json["details"]["field"], "name");
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::from_code(ErrorCode::StorageError);
        assert_eq!(err.to_string(), "StorageError: Storage operation failed");
    }
}
