//! Response envelopes
//!
//! Every success body carries `"status": "success"` with the payload under
//! `data.{key}`; list responses add a top-level `results` count. Failure
//! envelopes are produced by [`crate::error::Error`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

/// A successful JSON response
#[derive(Debug, Clone)]
pub struct Envelope {
    status: StatusCode,
    body: Value,
}

impl Envelope {
    /// `200 OK` with a single document under `data.{key}`
    pub fn ok(key: &str, value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({
                "status": "success",
                "data": { key: value },
            }),
        }
    }

    /// `201 Created` with the stored document under `data.{key}`
    pub fn created(key: &str, value: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: json!({
                "status": "success",
                "data": { key: value },
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn body(&self) -> &Value {
        &self.body
    }

    /// `200 OK` with a list under `data.{key}` and its length in `results`
    pub fn list(key: &str, items: Vec<Value>) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({
                "status": "success",
                "results": items.len(),
                "data": { key: items },
            }),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// `204 No Content`, for successful deletes
#[derive(Debug, Clone, Copy)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
