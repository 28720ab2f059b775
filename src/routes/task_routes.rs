//! Task endpoints, all scoped to the authenticated user
//!
//! - GET    /api/tasks
//! - POST   /api/tasks
//! - GET    /api/tasks/{id}
//! - PUT    /api/tasks/{id}
//! - DELETE /api/tasks/{id}
//! - PATCH  /api/tasks/{id}/complete?completed=<bool>

use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::identity;
use crate::db::{NewTask, TaskPatch};
use crate::routes::{
    json_response, parse_json_body, require_non_empty, BoxBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::{ApiError, Result};

#[derive(Debug, Deserialize)]
struct CompleteQuery {
    completed: bool,
}

pub async fn list_tasks(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let tasks = state.store.list_tasks(&user.id).await?;
    Ok(json_response(StatusCode::OK, &tasks))
}

pub async fn create_task(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let body: NewTask = parse_json_body(req).await?;
    require_non_empty(&body.title, "title")?;

    let task = state.store.create_task(&user.id, &body).await?;
    Ok(json_response(StatusCode::OK, &task))
}

pub async fn get_task(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let task = state.store.get_task(&user.id, id).await?;
    Ok(json_response(StatusCode::OK, &task))
}

pub async fn update_task(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let patch: TaskPatch = parse_json_body(req).await?;

    let task = state.store.update_task(&user.id, id, &patch).await?;
    Ok(json_response(StatusCode::OK, &task))
}

pub async fn delete_task(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    state.store.delete_task(&user.id, id).await?;
    Ok(json_response(
        StatusCode::OK,
        &MessageResponse {
            message: "Task deleted successfully".to_string(),
        },
    ))
}

/// PATCH /api/tasks/{id}/complete
///
/// Sets the completion flag to the explicitly supplied value - not a
/// bit-flip.
pub async fn toggle_completion(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;

    let query: CompleteQuery = serde_urlencoded::from_str(req.uri().query().unwrap_or(""))
        .map_err(|_| ApiError::Validation {
            field: "completed",
            message: "completed query parameter is required".to_string(),
        })?;

    let task = state
        .store
        .set_task_completed(&user.id, id, query.completed)
        .await?;
    Ok(json_response(StatusCode::OK, &task))
}
