//! HTTP routes for Taskgate
//!
//! Handlers return `Result<Response, ApiError>`; the server dispatch maps an
//! error to its JSON representation, so status-code policy lives in one
//! place.

pub mod auth_routes;
pub mod health;
pub mod skill_routes;
pub mod sub_agent_routes;
pub mod task_routes;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::types::ApiError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Maximum accepted request body size in bytes
const MAX_BODY_BYTES: usize = 10240;

/// Structured error body: machine-checkable category plus a human message,
/// with the offending field named for validation errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub(crate) fn full_body(content: String) -> BoxBody {
    Full::new(Bytes::from(content))
        .map_err(|never| match never {})
        .boxed()
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(full_body(json))
        .unwrap()
}

/// Render a typed error as its JSON response
pub fn error_response(err: &ApiError) -> Response<BoxBody> {
    json_response(
        err.status(),
        &ErrorResponse {
            error: err.public_message(),
            code: err.code(),
            field: err.field(),
        },
    )
}

pub(crate) async fn parse_json_body<T, B>(req: Request<B>) -> Result<T, ApiError>
where
    T: for<'de> Deserialize<'de>,
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // Limited stops reading as soon as the cap is crossed, so an oversized
    // body is never buffered in full.
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                ApiError::Validation {
                    field: "body",
                    message: "Request body too large".to_string(),
                }
            } else {
                ApiError::Validation {
                    field: "body",
                    message: format!("Failed to read body: {e}"),
                }
            }
        })?;

    serde_json::from_slice(&body.to_bytes()).map_err(|e| ApiError::Validation {
        field: "body",
        message: format!("Invalid JSON body: {e}"),
    })
}

/// Reject a blank or whitespace-only required field
pub(crate) fn require_non_empty(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation {
            field,
            message: format!("{field} is required"),
        });
    }
    Ok(())
}
