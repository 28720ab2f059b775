//! Sub-agents, scoped to their owning user
//!
//! Deleting a sub-agent removes its skills in the same transaction.

use crate::db::{now, parse_id, NewSubAgent, Store, SubAgentPatch, SubAgentRow};
use crate::types::{ApiError, Result};
use uuid::Uuid;

impl Store {
    pub async fn list_sub_agents(&self, owner: &str) -> Result<Vec<SubAgentRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM sub_agents WHERE user_id = ? ORDER BY created_at")
                .bind(owner)
                .fetch_all(self.pool())
                .await?,
        )
    }

    pub async fn create_sub_agent(&self, owner: &str, input: &NewSubAgent) -> Result<SubAgentRow> {
        let id = Uuid::new_v4().to_string();
        let timestamp = now();

        sqlx::query(
            "INSERT INTO sub_agents (id, name, description, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(owner)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(self.pool())
        .await?;

        Ok(SubAgentRow {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            user_id: owner.to_string(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    pub async fn get_sub_agent(&self, owner: &str, id: &str) -> Result<SubAgentRow> {
        let id = parse_id(id, "sub-agent")?;

        sqlx::query_as("SELECT * FROM sub_agents WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(self.pool())
            .await?
            .ok_or(ApiError::NotFound("sub-agent"))
    }

    pub async fn update_sub_agent(
        &self,
        owner: &str,
        id: &str,
        patch: &SubAgentPatch,
    ) -> Result<SubAgentRow> {
        let id = parse_id(id, "sub-agent")?;
        let mut tx = self.pool().begin().await?;

        let existing: Option<SubAgentRow> =
            sqlx::query_as("SELECT * FROM sub_agents WHERE id = ? AND user_id = ?")
                .bind(id.to_string())
                .bind(owner)
                .fetch_optional(&mut *tx)
                .await?;
        let agent = existing.ok_or(ApiError::NotFound("sub-agent"))?;

        let name = patch.name.clone().unwrap_or_else(|| agent.name.clone());
        let description = patch.description.clone().or_else(|| agent.description.clone());
        let updated_at = now();

        sqlx::query("UPDATE sub_agents SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(&description)
            .bind(&updated_at)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(SubAgentRow {
            name,
            description,
            updated_at,
            ..agent
        })
    }

    /// Delete a sub-agent and every skill under it, atomically.
    pub async fn delete_sub_agent(&self, owner: &str, id: &str) -> Result<()> {
        let id = parse_id(id, "sub-agent")?;
        let mut tx = self.pool().begin().await?;

        let deleted = sqlx::query("DELETE FROM sub_agents WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::NotFound("sub-agent"));
        }

        sqlx::query("DELETE FROM skills WHERE sub_agent_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
