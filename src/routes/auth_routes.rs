//! Authentication endpoints
//!
//! - POST /api/auth/signup - register and receive a token
//! - POST /api/auth/login  - authenticate and receive a token
//! - POST /api/auth/logout - stateless acknowledgement (tokens stay valid
//!   until they expire; there is no revocation list)
//! - GET  /api/auth/me     - current principal from the bearer token

use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, identity, verify_password};
use crate::db::{Store, UserRow};
use crate::routes::{
    json_response, parse_json_body, require_non_empty, BoxBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::{ApiError, Result};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Validate, hash, and insert a new user. A duplicate email surfaces as
/// Conflict.
async fn register(store: &Store, email: &str, password: &str) -> Result<UserRow> {
    require_non_empty(email, "email")?;
    require_non_empty(password, "password")?;

    let password_hash = hash_password(password)?;
    match store.create_user(email, &password_hash).await {
        Ok(user) => Ok(user),
        Err(err) => {
            if matches!(err, ApiError::Conflict(_)) {
                warn!("Signup rejected, email already registered: {email}");
            }
            Err(err)
        }
    }
}

/// Check credentials against the stored hash. An unknown email and a wrong
/// password produce the same rejection.
async fn authenticate(store: &Store, email: &str, password: &str) -> Result<UserRow> {
    store
        .find_user_by_email(email)
        .await?
        .filter(|user| verify_password(password, &user.password_hash))
        .ok_or_else(|| ApiError::Unauthenticated("Incorrect email or password".to_string()))
}

fn token_response(state: &AppState, user: &UserRow) -> Result<Response<BoxBody>> {
    let token = state.tokens.issue(parse_user_id(&user.id)?)?;
    Ok(json_response(
        StatusCode::OK,
        &TokenResponse {
            access_token: token,
            token_type: "bearer",
        },
    ))
}

/// POST /api/auth/signup
pub async fn signup(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let body: CredentialsRequest = parse_json_body(req).await?;
    let user = register(&state.store, &body.email, &body.password).await?;

    info!("New user registered: {}", user.email);
    token_response(&state, &user)
}

/// POST /api/auth/login
pub async fn login(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let body: CredentialsRequest = parse_json_body(req).await?;
    let user = authenticate(&state.store, &body.email, &body.password).await?;

    info!("User logged in: {}", user.email);
    token_response(&state, &user)
}

/// POST /api/auth/logout
pub fn logout() -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &MessageResponse {
            message: "Successfully logged out".to_string(),
        },
    )
}

/// GET /api/auth/me
pub async fn me(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let user = identity::resolve(&state.store, &state.tokens, req.headers()).await?;
    Ok(json_response(StatusCode::OK, &user))
}

/// Stored ids are always UUIDs; anything else is a corrupt row, not a client
/// error.
fn parse_user_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::Internal(format!("corrupt user id in store: {id}")))
}
