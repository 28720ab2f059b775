//! Row and input types for the store
//!
//! Rows serialize directly as API representations; ids are UUID strings and
//! timestamps RFC 3339 UTC. Patch types are partial by construction - a
//! `None` field leaves the stored value untouched.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SubAgentRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SkillRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sub_agent_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NewSubAgent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubAgentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Skill creation input. The referenced sub-agent id is validated for shape
/// at the route boundary; ownership is checked by the store.
#[derive(Debug)]
pub struct NewSkill {
    pub name: String,
    pub description: Option<String>,
    pub sub_agent_id: uuid::Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}
