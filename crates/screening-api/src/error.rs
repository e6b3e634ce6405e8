use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use screening_core::models::validation::FieldError;
use screening_engine::error::EngineError;
use screening_rules::error::{EvaluationError, EvaluationErrorKind, RegistryError};

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unprocessable(Vec<FieldError>),
    /// Rule evaluation failed; the same request may be retried.
    Unavailable(EvaluationError),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ValidationBody {
    error: String,
    valid: bool,
    validation_errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct RetryableBody {
    error: String,
    retryable: bool,
    kind: EvaluationErrorKind,
    rule_id: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unprocessable(validation_errors) => {
                let body = ValidationBody {
                    error: "validation failed".to_string(),
                    valid: false,
                    validation_errors,
                };
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }
            ApiError::Unavailable(err) => {
                let body = RetryableBody {
                    error: err.message,
                    retryable: true,
                    kind: err.kind,
                    rule_id: err.rule_id,
                };
                return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Validation(errors) => ApiError::Unprocessable(errors),
            EngineError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            EngineError::Evaluation(err) => ApiError::Unavailable(err),
            EngineError::Conflict(msg) | EngineError::InvalidState(msg) => ApiError::Conflict(msg),
            EngineError::Registry(RegistryError::Conflict(_)) => ApiError::Conflict(e.to_string()),
            EngineError::Registry(_) => ApiError::BadRequest(e.to_string()),
            EngineError::Storage(_) => ApiError::Internal(e.to_string()),
        }
    }
}
