//! SQLite-backed store for Taskgate
//!
//! All ownership scoping lives here: every query is parameterized by the
//! authenticated user's id, directly or joined through the owning sub-agent.
//! Mutations run their existence/ownership check and the write inside one
//! transaction, so a concurrent delete of the same row cannot interleave.

pub mod models;
mod skills;
mod sub_agents;
mod tasks;
mod users;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::types::{ApiError, Result};

pub use models::{
    NewSkill, NewSubAgent, NewTask, SkillPatch, SkillRow, SubAgentPatch, SubAgentRow, TaskPatch,
    TaskRow, UserRow,
};

/// Idempotent schema, applied at startup. `ON DELETE CASCADE` backs the
/// explicit cascade statements in the delete paths.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        completed INTEGER NOT NULL DEFAULT 0,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sub_agents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS skills (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        sub_agent_id TEXT NOT NULL REFERENCES sub_agents(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_sub_agents_user ON sub_agents(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_skills_sub_agent ON skills(sub_agent_id)",
];

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to the database and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(ApiError::Database)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Store ready at {}", database_url);
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Parse a caller-supplied identifier.
///
/// A malformed id maps to `NotFound` for the named entity, so malformed and
/// absent identifiers are indistinguishable by construction and id-format
/// probing leaks nothing.
pub(crate) fn parse_id(raw: &str, entity: &'static str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(entity))
}

/// Current timestamp in the stored RFC 3339 form. Fixed microsecond
/// precision keeps the TEXT column lexicographically ordered by time.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Map a unique-constraint violation to the given conflict error, leaving
/// every other database failure untouched.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict(message.to_string())
        }
        _ => ApiError::Database(err),
    }
}

#[cfg(test)]
pub(crate) async fn test_store() -> Store {
    // Named in-memory database, shared across the pool's connections but
    // unique per test
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
    Store::connect(&url).await.unwrap()
}
