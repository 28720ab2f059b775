//! Sub-agent endpoints, all scoped to the authenticated user
//!
//! - GET    /api/sub-agents
//! - POST   /api/sub-agents
//! - GET    /api/sub-agents/{id}
//! - PUT    /api/sub-agents/{id}
//! - DELETE /api/sub-agents/{id} (cascades to the sub-agent's skills)

use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use crate::auth::identity;
use crate::db::{NewSubAgent, SubAgentPatch};
use crate::routes::{
    json_response, parse_json_body, require_non_empty, BoxBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::Result;

pub async fn list_sub_agents(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let agents = state.store.list_sub_agents(&user.id).await?;
    Ok(json_response(StatusCode::OK, &agents))
}

pub async fn create_sub_agent(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let body: NewSubAgent = parse_json_body(req).await?;
    require_non_empty(&body.name, "name")?;

    let agent = state.store.create_sub_agent(&user.id, &body).await?;
    Ok(json_response(StatusCode::OK, &agent))
}

pub async fn get_sub_agent(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let agent = state.store.get_sub_agent(&user.id, id).await?;
    Ok(json_response(StatusCode::OK, &agent))
}

pub async fn update_sub_agent(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    let patch: SubAgentPatch = parse_json_body(req).await?;

    let agent = state.store.update_sub_agent(&user.id, id, &patch).await?;
    Ok(json_response(StatusCode::OK, &agent))
}

pub async fn delete_sub_agent(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    state.store.delete_sub_agent(&user.id, id).await?;
    Ok(json_response(
        StatusCode::OK,
        &MessageResponse {
            message: "Sub-agent deleted successfully".to_string(),
        },
    ))
}
