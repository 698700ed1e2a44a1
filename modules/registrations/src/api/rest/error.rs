use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::api::rest::dto::ErrorBody;
use crate::domain::error::DomainError;

/// HTTP error response carrying an `ErrorBody`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Helper to create an ApiError with less boilerplate
pub fn from_parts(
    status: StatusCode,
    message: impl Into<String>,
    errors: Option<BTreeMap<String, String>>,
) -> ApiError {
    ApiError {
        status,
        body: ErrorBody {
            message: message.into(),
            errors,
        },
    }
}

/// Map domain error to an HTTP error response
pub fn map_domain_error(e: &DomainError, instance: &str) -> ApiError {
    match e {
        DomainError::NotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            format!("Registration with id {id} was not found"),
            None,
        ),
        DomainError::Validation { errors } => from_parts(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            Some(errors.clone().into_map()),
        ),
        DomainError::Vanished { id } => from_parts(
            StatusCode::CONFLICT,
            format!("Registration with id {id} was removed while being updated"),
            None,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, instance, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred",
                None,
            )
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return from_parts(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
                None,
            );
        }
        from_parts(
            StatusCode::BAD_REQUEST,
            format!("Malformed request body: {}", rejection.body_text()),
            None,
        )
    }
}
