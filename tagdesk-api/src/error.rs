//! Error types for tagdesk-api
//!
//! Every handler error renders as `{"detail": ...}`: a message string for
//! 400/404/500, a list of field errors for 422.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::classifier::ClassifierError;

/// One violated request constraint
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    /// Location of the offending value, e.g. `["body", "email"]`
    pub loc: Vec<String>,
    /// Human readable explanation
    pub msg: String,
    /// Machine readable error kind
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

/// Error body for 400/404/500 responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    #[schema(example = "Complaint 7 not found")]
    pub detail: String,
}

/// Error body for 422 responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorBody {
    pub detail: Vec<FieldError>,
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Malformed request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Request failed validation (422)
    #[error("Validation failed: {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Inference call failed (500)
    #[error("Classification failed: {0}")]
    Classification(#[from] ClassifierError),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// tagdesk-common error
    #[error(transparent)]
    Common(#[from] tagdesk_common::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Single-field validation failure
    pub fn invalid(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(loc, msg, kind)])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(errors) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ValidationErrorBody { detail: errors }),
                )
                    .into_response();
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Common(tagdesk_common::Error::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ref err @ (ApiError::Classification(_)
            | ApiError::Internal(_)
            | ApiError::Common(_)
            | ApiError::Other(_)) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON that does not fit the request type
            JsonRejection::JsonDataError(err) => {
                ApiError::invalid(&["body"], err.body_text(), "value_error.json")
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid(&["query"], rejection.body_text(), "value_error.query")
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid(&["path", "id"], rejection.body_text(), "type_error.integer")
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
