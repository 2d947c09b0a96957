//! Error types and HTTP response conversion
//!
//! Every handler error becomes a JSON envelope: `"status": "fail"` for
//! client mistakes (4xx) and `"status": "error"` for server faults (5xx).
//! Unexpected 5xx faults are logged with their real cause and surfaced to
//! clients as a generic message; in the development environment a
//! diagnostics middleware adds the full debug rendering to the body.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::state::AppState;
use crate::store::StoreError;

/// Result type used throughout the handler layer
pub type Result<T> = std::result::Result<T, Error>;

/// Message sent to clients for faults they should not see the details of
const GENERIC_MESSAGE: &str = "Something went very wrong!";

/// Application error, convertible into a JSON failure envelope
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Lookup by id found nothing
    #[error("No document found with that ID")]
    NotFound,

    /// Payload failed entity validation
    #[error("{0}")]
    Validation(String),

    /// A unique field collided with an existing document
    #[error("Duplicate field value: {0}. Please use another value!")]
    Duplicate(String),

    /// A request-level problem with an explicit status, e.g. a malformed
    /// JSON body or an unparsable path parameter
    #[error("{1}")]
    Operational(StatusCode, String),

    /// Filesystem failure (seed data loading)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else; always rendered as the generic 500
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::Duplicate(_) => StatusCode::BAD_REQUEST,
            Self::Operational(status, _) => *status,
            Self::Config(_) | Self::Io(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Envelope status label: `fail` for 4xx, `error` for 5xx
    fn status_label(&self) -> &'static str {
        if self.status_code().is_client_error() {
            "fail"
        } else {
            "error"
        }
    }

    fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            GENERIC_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => Self::Validation(message),
            StoreError::Duplicate { value, .. } => Self::Duplicate(value),
        }
    }
}

/// Debug rendering of the original error, stashed in response extensions
/// for the development diagnostics middleware.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = json!({
            "status": self.status_label(),
            "message": self.client_message(),
        });
        let detail = ErrorDetail(format!("{self:?}"));

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(detail);
        response
    }
}

/// Rewrites error bodies with a `detail` field in development.
///
/// Production responses pass through untouched; the detail never leaves the
/// process outside development.
pub async fn error_diagnostics(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if !state.config().service.environment.is_development() {
        return response;
    }
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let Ok(bytes) = axum::body::to_bytes(body, usize::MAX).await else {
        return parts.status.into_response();
    };

    let mut envelope: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        // Non-JSON error body (e.g. from an outer layer); leave it alone
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };
    if let Some(map) = envelope.as_object_mut() {
        map.insert("detail".to_string(), Value::String(detail));
    }

    // The body changed length; the old Content-Length would be wrong
    parts.headers.remove(header::CONTENT_LENGTH);
    let mut response = Json(envelope).into_response();
    *response.status_mut() = parts.status;
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404_fail() {
        let err = Error::NotFound;
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.status_label(), "fail");
        assert_eq!(err.to_string(), "No document found with that ID");
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = Error::Validation("Invalid input data. A tour must have a name".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.status_label(), "fail");
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = Error::Internal("lock poisoned".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.status_label(), "error");
        assert_eq!(err.client_message(), GENERIC_MESSAGE);
    }

    #[test]
    fn test_store_error_conversion() {
        let err: Error = StoreError::duplicate("name", "\"Sea Explorer\"").into();
        assert!(matches!(err, Error::Duplicate(_)));
        assert_eq!(
            err.to_string(),
            "Duplicate field value: \"Sea Explorer\". Please use another value!"
        );

        let err: Error = StoreError::Validation("bad".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_operational_keeps_given_status() {
        let err = Error::Operational(StatusCode::BAD_REQUEST, "malformed JSON".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "malformed JSON");
    }

    #[test]
    fn test_into_response_stashes_detail() {
        let response = Error::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorDetail>().is_some());
    }
}
