//! Liveness endpoint

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::{json_response, BoxBody};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /
pub fn health_check() -> Response<BoxBody> {
    json_response(StatusCode::OK, &HealthResponse { status: "ok" })
}
