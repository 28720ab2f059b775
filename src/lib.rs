//! Taskgate - multi-tenant task management API
//!
//! Users register and authenticate with email + password, then manage three
//! ownership-scoped resource types: personal tasks, sub-agents, and skills
//! attached to sub-agents. Access tokens are signed, time-limited bearer
//! tokens; every authenticated request resolves the principal from its
//! authorization header before touching the store.
//!
//! ## Components
//!
//! - **auth**: password hashing, token issuance/verification, identity
//!   resolution
//! - **db**: SQLite store with per-user ownership scoping (skills scoped
//!   through their owning sub-agent)
//! - **routes**: JSON request handlers
//! - **server**: accept loop and dispatch

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{ApiError, Result};
