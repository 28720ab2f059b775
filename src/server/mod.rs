//! HTTP server: accept loop and request dispatch
//!
//! One tokio task per connection, HTTP/1, manual routing over
//! `(method, path segments)`. No cross-request shared mutable state lives
//! here - everything a handler needs is behind `AppState`, and the store is
//! the sole shared resource.

use hyper::service::service_fn;
use hyper::{server::conn::http1, Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::TokenService;
use crate::config::Args;
use crate::db::Store;
use crate::routes::{self, BoxBody};
use crate::types::{ApiError, Result};

/// Shared application state, built once at startup
pub struct AppState {
    pub args: Args,
    pub store: Store,
    pub tokens: TokenService,
}

/// Bind and serve until the process is stopped.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to bind {}: {e}", state.args.listen)))?;

    info!("Taskgate listening on {}", state.args.listen);
    if state.args.dev_mode {
        warn!("Development mode enabled - using the built-in insecure signing secret");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<hyper::body::Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match route(state, req).await {
        Ok(response) => response,
        Err(err) => {
            // Store internals stay in the logs; the client sees a generic 500
            if matches!(err, ApiError::Database(_) | ApiError::Internal(_)) {
                error!("{} {} failed: {}", method, path, err);
            }
            routes::error_response(&err)
        }
    };

    debug!("{} {} {} ({})", method, path, response.status(), addr);
    Ok(response)
}

async fn route(
    state: Arc<AppState>,
    req: Request<hyper::body::Incoming>,
) -> Result<Response<BoxBody>> {
    let method = req.method().clone();
    // Trailing slashes are accepted everywhere
    let path = req.uri().path().trim_matches('/').to_string();
    let segments: Vec<&str> = if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    };

    match (&method, segments.as_slice()) {
        (&Method::GET, []) => Ok(routes::health::health_check()),

        (&Method::POST, ["api", "auth", "signup"]) => routes::auth_routes::signup(req, state).await,
        (&Method::POST, ["api", "auth", "login"]) => routes::auth_routes::login(req, state).await,
        (&Method::POST, ["api", "auth", "logout"]) => Ok(routes::auth_routes::logout()),
        (&Method::GET, ["api", "auth", "me"]) => routes::auth_routes::me(req, state).await,

        (&Method::GET, ["api", "tasks"]) => routes::task_routes::list_tasks(req, state).await,
        (&Method::POST, ["api", "tasks"]) => routes::task_routes::create_task(req, state).await,
        (&Method::GET, ["api", "tasks", id]) => routes::task_routes::get_task(req, state, id).await,
        (&Method::PUT, ["api", "tasks", id]) => {
            routes::task_routes::update_task(req, state, id).await
        }
        (&Method::DELETE, ["api", "tasks", id]) => {
            routes::task_routes::delete_task(req, state, id).await
        }
        (&Method::PATCH, ["api", "tasks", id, "complete"]) => {
            routes::task_routes::toggle_completion(req, state, id).await
        }

        (&Method::GET, ["api", "sub-agents"]) => {
            routes::sub_agent_routes::list_sub_agents(req, state).await
        }
        (&Method::POST, ["api", "sub-agents"]) => {
            routes::sub_agent_routes::create_sub_agent(req, state).await
        }
        (&Method::GET, ["api", "sub-agents", id]) => {
            routes::sub_agent_routes::get_sub_agent(req, state, id).await
        }
        (&Method::PUT, ["api", "sub-agents", id]) => {
            routes::sub_agent_routes::update_sub_agent(req, state, id).await
        }
        (&Method::DELETE, ["api", "sub-agents", id]) => {
            routes::sub_agent_routes::delete_sub_agent(req, state, id).await
        }

        (&Method::GET, ["api", "skills"]) => routes::skill_routes::list_skills(req, state).await,
        (&Method::POST, ["api", "skills"]) => routes::skill_routes::create_skill(req, state).await,
        (&Method::GET, ["api", "skills", id]) => {
            routes::skill_routes::get_skill(req, state, id).await
        }
        (&Method::PUT, ["api", "skills", id]) => {
            routes::skill_routes::update_skill(req, state, id).await
        }
        (&Method::DELETE, ["api", "skills", id]) => {
            routes::skill_routes::delete_skill(req, state, id).await
        }

        _ => Err(ApiError::NotFound("resource")),
    }
}
