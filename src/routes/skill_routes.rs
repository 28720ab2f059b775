//! Skill endpoints
//!
//! Skills are owned through their sub-agent, so every operation here reaches
//! the store's join-based scoping. Creation is the documented exception to
//! the NotFound folding: a sub-agent that is not yours is Forbidden.
//!
//! - GET    /api/skills[?sub_agent_id=...]
//! - POST   /api/skills
//! - GET    /api/skills/{id}
//! - PUT    /api/skills/{id}
//! - DELETE /api/skills/{id}

use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::identity;
use crate::db::{NewSkill, SkillPatch};
use crate::routes::{
    json_response, parse_json_body, require_non_empty, BoxBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::{ApiError, Result};

#[derive(Debug, Deserialize)]
struct ListQuery {
    sub_agent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sub_agent_id: String,
}

/// A malformed sub-agent id is a validation failure at the input-parse
/// stage - distinct from the ownership check that follows.
fn parse_sub_agent_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation {
        field: "sub_agent_id",
        message: "Invalid sub-agent ID format".to_string(),
    })
}

/// Parse the optional `sub_agent_id` filter from the raw query string. An
/// unreadable query string is the caller's error, never an unfiltered list.
fn parse_list_filter(raw: &str) -> Result<Option<Uuid>> {
    let query: ListQuery = serde_urlencoded::from_str(raw).map_err(|_| ApiError::Validation {
        field: "sub_agent_id",
        message: "Invalid query parameters".to_string(),
    })?;
    query
        .sub_agent_id
        .as_deref()
        .map(parse_sub_agent_id)
        .transpose()
}

pub async fn list_skills(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;

    let filter = parse_list_filter(req.uri().query().unwrap_or(""))?;

    let skills = state.store.list_skills(&user.id, filter).await?;
    Ok(json_response(StatusCode::OK, &skills))
}

pub async fn create_skill(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let body: CreateSkillRequest = parse_json_body(req).await?;
    require_non_empty(&body.name, "name")?;
    let sub_agent_id = parse_sub_agent_id(&body.sub_agent_id)?;

    let skill = state
        .store
        .create_skill(
            &user.id,
            &NewSkill {
                name: body.name,
                description: body.description,
                sub_agent_id,
            },
        )
        .await?;
    Ok(json_response(StatusCode::OK, &skill))
}

pub async fn get_skill(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let skill = state.store.get_skill(&user.id, id).await?;
    Ok(json_response(StatusCode::OK, &skill))
}

pub async fn update_skill(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let patch: SkillPatch = parse_json_body(req).await?;

    let skill = state.store.update_skill(&user.id, id, &patch).await?;
    Ok(json_response(StatusCode::OK, &skill))
}

pub async fn delete_skill(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    state.store.delete_skill(&user.id, id).await?;
    Ok(json_response(
        StatusCode::OK,
        &MessageResponse {
            message: "Skill deleted successfully".to_string(),
        },
    ))
}
