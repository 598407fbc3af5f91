//! Mapping of request outcomes onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::Error;
use crate::validate::ValidationError;

/// Body message for malformed ids.
pub const MALFORMED_ID_MESSAGE: &str = "malformatted id";

/// Body message for routes that match nothing.
pub const UNKNOWN_ENDPOINT_MESSAGE: &str = "unknown endpoint";

/// Body message for store faults; details stay in the server log.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Every way a request can fail.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required field was missing.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A unique field is already taken.
    #[error("{field} must be unique")]
    Conflict {
        /// The unique field.
        field: &'static str,
    },

    /// The id is well-formed but matches no record.
    #[error("record not found")]
    NotFound,

    /// The id does not parse as a record id.
    #[error("{}", MALFORMED_ID_MESSAGE)]
    MalformedId,

    /// The request body is not acceptable JSON for the resource.
    #[error("{0}")]
    MalformedPayload(String),

    /// The route matched nothing.
    #[error("{}", UNKNOWN_ENDPOINT_MESSAGE)]
    UnknownEndpoint,

    /// Infrastructure failure in the store.
    #[error("store fault: {0}")]
    Store(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::MalformedId(_) => Self::MalformedId,
            other => Self::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedPayload(rejection.body_text())
    }
}

impl ApiError {
    /// Status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::Conflict { .. }
            | Self::MalformedId
            | Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UnknownEndpoint => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::NotFound => status.into_response(),
            Self::Store(err) => {
                error!("Request failed: {err}");
                (status, Json(json!({ "error": INTERNAL_ERROR_MESSAGE }))).into_response()
            }
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let missing = ValidationError::missing("title", "Title is required");
        assert_eq!(ApiError::from(missing).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Conflict { field: "name" }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MalformedId.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::UnknownEndpoint.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Store(Error::internal("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        let missing = ValidationError::missing("url", "URL is required");
        assert_eq!(ApiError::from(missing).to_string(), "URL is required");
        assert_eq!(
            ApiError::Conflict { field: "name" }.to_string(),
            "name must be unique"
        );
        assert_eq!(ApiError::MalformedId.to_string(), "malformatted id");
        assert_eq!(ApiError::UnknownEndpoint.to_string(), "unknown endpoint");
    }

    #[test]
    fn test_malformed_id_is_not_a_fault() {
        let err = ApiError::from(Error::malformed_id("invalidIdFormat"));
        assert!(matches!(err, ApiError::MalformedId));
    }

    #[test]
    fn test_other_store_errors_are_faults() {
        let err = ApiError::from(Error::LockPoisoned("insert"));
        assert!(matches!(err, ApiError::Store(_)));
    }

    #[test]
    fn test_not_found_has_empty_body() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get("content-type").is_none());
    }

    #[test]
    fn test_json_error_body_content_type() {
        let response = ApiError::MalformedId.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_store_fault_body_hides_cause() {
        let response = ApiError::Store(Error::internal("disk unplugged")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"internal server error"}"#);
        assert!(!body.contains("disk unplugged"));
    }
}
