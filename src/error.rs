//! Unified error types.
//!
//! Two layers, kept apart on purpose:
//!
//! - [`Error`] is an infrastructure failure nobody downstream knows how to
//!   answer: a body that could not be read, a poisoned lock, a token that
//!   could not be signed. Handlers and middleware propagate it with `?` and
//!   the error boundary turns it into a `500`.
//! - [`ApiError`] is a failure the client caused and is told about: bad
//!   credentials, a name that fails validation, an unknown id. It renders as
//!   an [`ErrorPayload`] response and never reaches the error boundary.
//!
//! Every error response, whatever its status, carries the same
//! [`ErrorPayload`] shape.

use chrono::{DateTime, Utc};
use http::header::{self, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::handler::Outcome;
use crate::response::Response;
use crate::status::Status;
use crate::validation::ValidationError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that surface as `500 Internal Server Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read body: {0}")]
    Body(#[source] BoxError),

    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error("failed to sign token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("token lifetime runs past the representable time range")]
    TokenLifetime,

    #[error("failed to render Swagger UI: {0}")]
    SwaggerUi(String),

    #[error("no state of type `{0}` is registered")]
    MissingState(&'static str),

    #[error("user store lock poisoned")]
    StorePoisoned,

    #[error("{0}")]
    Handler(String),
}

/// Failures reported back to the client with a 4xx status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("A valid bearer token is required")]
    Unauthenticated,

    #[error("Role '{0}' is required")]
    Forbidden(&'static str),

    #[error("No user found with ID {0}")]
    UserNotFound(i64),

    #[error("User ID must be an integer")]
    InvalidId,

    #[error("{0}")]
    InvalidBody(String),

    #[error("No route matches {0}")]
    RouteNotFound(String),

    #[error("Method {method} is not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error(transparent)]
    Internal(#[from] Error),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) | Self::InvalidId | Self::InvalidBody(_) => Status::BadRequest,
            Self::InvalidCredentials | Self::Unauthenticated => Status::Unauthorized,
            Self::Forbidden(_) => Status::Forbidden,
            Self::UserNotFound(_) | Self::RouteNotFound(_) => Status::NotFound,
            Self::MethodNotAllowed { .. } => Status::MethodNotAllowed,
            Self::Internal(_) => Status::InternalServerError,
        }
    }

    /// Short, stable summary shown in [`ErrorPayload::message`].
    pub fn message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation failed",
            Self::InvalidCredentials => "Authentication failed",
            Self::Unauthenticated => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::UserNotFound(_) => "User not found",
            Self::InvalidId => "Invalid request",
            Self::InvalidBody(_) => "Invalid request body",
            Self::RouteNotFound(_) => "Not found",
            Self::MethodNotAllowed { .. } => "Method not allowed",
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.status(), self.message(), Some(self.to_string()))
    }

    /// Client errors become responses; [`ApiError::Internal`] keeps
    /// propagating so the error boundary logs and answers it.
    pub fn into_outcome(self) -> Outcome {
        match self {
            Self::Internal(e) => Err(e),
            other => Ok(other.payload().into_response()),
        }
    }
}

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// The single JSON shape of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub status_code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorPayload {
    pub fn new(status: Status, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status_code: status.into(),
            message: message.into(),
            details,
            timestamp: Utc::now(),
        }
    }

    /// `500` payload for a failure nobody handled.
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(Status::InternalServerError, INTERNAL_ERROR_MESSAGE, Some(details.into()))
    }

    pub fn into_response(self) -> Response {
        // Plain strings and a timestamp always serialize.
        let body = match serde_json::to_vec(&self) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "failed to encode error payload");
                Vec::new()
            }
        };
        let status = http::StatusCode::from_u16(self.status_code)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Response::bytes(body);
        response.set_status(status);
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_is_a_400_with_rule_in_details() {
        let err = ApiError::from(ValidationError::TooFewWords { min: 3 });
        let payload = err.payload();

        assert_eq!(payload.status_code, 400);
        assert_eq!(payload.message, "Validation failed");
        assert_eq!(payload.details.as_deref(), Some("Name must contain at least 3 words"));
    }

    #[test]
    fn not_found_details_name_the_id() {
        let payload = ApiError::UserNotFound(42).payload();
        assert_eq!(payload.status_code, 404);
        assert_eq!(payload.details.as_deref(), Some("No user found with ID 42"));
    }

    #[test]
    fn internal_errors_keep_propagating() {
        let outcome = ApiError::Internal(Error::StorePoisoned).into_outcome();
        assert!(matches!(outcome, Err(Error::StorePoisoned)));
    }

    #[test]
    fn payload_serializes_in_camel_case_and_omits_missing_details() {
        let payload = ErrorPayload::new(Status::NotFound, "Not found", None);
        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["message"], "Not found");
        assert!(json.get("details").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn payload_response_carries_status_and_json_content_type() {
        let response = ErrorPayload::internal("boom").into_response();
        assert_eq!(response.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.header("content-type"), Some("application/json"));
    }
}
