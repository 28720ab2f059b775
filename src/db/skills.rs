//! Skills, owned transitively through their sub-agent
//!
//! A skill's effective owner is the user who owns its sub-agent, so every
//! query here joins through `sub_agents` on the authenticated user's id.
//! Creation is the one deliberate asymmetry in the API: referencing someone
//! else's sub-agent is Forbidden, where every read/update/delete path folds
//! foreign ownership into NotFound.

use crate::db::{now, parse_id, NewSkill, SkillPatch, SkillRow, Store};
use crate::types::{ApiError, Result};
use uuid::Uuid;

const OWNED_SKILL: &str = "SELECT skills.* FROM skills \
     JOIN sub_agents ON skills.sub_agent_id = sub_agents.id \
     WHERE skills.id = ? AND sub_agents.user_id = ?";

impl Store {
    /// List skills across all of the owner's sub-agents, optionally narrowed
    /// to one sub-agent.
    pub async fn list_skills(
        &self,
        owner: &str,
        sub_agent_id: Option<Uuid>,
    ) -> Result<Vec<SkillRow>> {
        let rows = match sub_agent_id {
            Some(filter) => {
                sqlx::query_as(
                    "SELECT skills.* FROM skills \
                     JOIN sub_agents ON skills.sub_agent_id = sub_agents.id \
                     WHERE sub_agents.user_id = ? AND skills.sub_agent_id = ? \
                     ORDER BY skills.created_at",
                )
                .bind(owner)
                .bind(filter.to_string())
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT skills.* FROM skills \
                     JOIN sub_agents ON skills.sub_agent_id = sub_agents.id \
                     WHERE sub_agents.user_id = ? \
                     ORDER BY skills.created_at",
                )
                .bind(owner)
                .fetch_all(self.pool())
                .await?
            }
        };
        Ok(rows)
    }

    /// Create a skill under one of the owner's sub-agents.
    ///
    /// Referencing a sub-agent that is missing or belongs to another user is
    /// Forbidden - the ownership check and the insert share a transaction.
    pub async fn create_skill(&self, owner: &str, input: &NewSkill) -> Result<SkillRow> {
        let sub_agent_id = input.sub_agent_id.to_string();
        let mut tx = self.pool().begin().await?;

        let owned: Option<(String,)> =
            sqlx::query_as("SELECT id FROM sub_agents WHERE id = ? AND user_id = ?")
                .bind(&sub_agent_id)
                .bind(owner)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Err(ApiError::Forbidden(
                "Sub-agent does not belong to current user".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let timestamp = now();

        sqlx::query(
            "INSERT INTO skills (id, name, description, sub_agent_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&sub_agent_id)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(SkillRow {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            sub_agent_id,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    pub async fn get_skill(&self, owner: &str, id: &str) -> Result<SkillRow> {
        let id = parse_id(id, "skill")?;

        sqlx::query_as(OWNED_SKILL)
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(self.pool())
            .await?
            .ok_or(ApiError::NotFound("skill"))
    }

    pub async fn update_skill(&self, owner: &str, id: &str, patch: &SkillPatch) -> Result<SkillRow> {
        let id = parse_id(id, "skill")?;
        let mut tx = self.pool().begin().await?;

        let existing: Option<SkillRow> = sqlx::query_as(OWNED_SKILL)
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        let skill = existing.ok_or(ApiError::NotFound("skill"))?;

        let name = patch.name.clone().unwrap_or_else(|| skill.name.clone());
        let description = patch.description.clone().or_else(|| skill.description.clone());
        let updated_at = now();

        sqlx::query("UPDATE skills SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(&description)
            .bind(&updated_at)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(SkillRow {
            name,
            description,
            updated_at,
            ..skill
        })
    }

    pub async fn delete_skill(&self, owner: &str, id: &str) -> Result<()> {
        let id = parse_id(id, "skill")?;
        let mut tx = self.pool().begin().await?;

        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT skills.id FROM skills \
             JOIN sub_agents ON skills.sub_agent_id = sub_agents.id \
             WHERE skills.id = ? AND sub_agents.user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_none() {
            return Err(ApiError::NotFound("skill"));
        }

        sqlx::query("DELETE FROM skills WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_store, NewSubAgent};

    async fn user(store: &Store, email: &str) -> String {
        store.create_user(email, "digest").await.unwrap().id
    }

    async fn sub_agent(store: &Store, owner: &str, name: &str) -> Uuid {
        let row = store
            .create_sub_agent(
                owner,
                &NewSubAgent {
                    name: name.to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        Uuid::parse_str(&row.id).unwrap()
    }

    fn new_skill(name: &str, sub_agent_id: Uuid) -> NewSkill {
        NewSkill {
            name: name.to_string(),
            description: None,
            sub_agent_id,
        }
    }

    #[tokio::test]
    async fn create_under_own_sub_agent_succeeds() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let agent = sub_agent(&store, &alice, "researcher").await;

        let skill = store
            .create_skill(&alice, &new_skill("summarizing", agent))
            .await
            .unwrap();
        assert_eq!(skill.sub_agent_id, agent.to_string());

        // The skill's effective owner resolves to Alice
        let fetched = store.get_skill(&alice, &skill.id).await.unwrap();
        assert_eq!(fetched.name, "summarizing");
    }

    #[tokio::test]
    async fn create_under_foreign_sub_agent_is_forbidden() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let bob = user(&store, "bob@x.com").await;
        let alices_agent = sub_agent(&store, &alice, "researcher").await;

        // Forbidden here, where read paths would say NotFound: the one
        // deliberate asymmetry in the ownership rules
        let err = store
            .create_skill(&bob, &new_skill("stealing", alices_agent))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        // A nonexistent sub-agent is also Forbidden on this path
        let err = store
            .create_skill(&bob, &new_skill("floating", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn reads_fold_foreign_ownership_into_not_found() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let bob = user(&store, "bob@x.com").await;
        let agent = sub_agent(&store, &alice, "researcher").await;
        let skill = store
            .create_skill(&alice, &new_skill("summarizing", agent))
            .await
            .unwrap();

        assert!(matches!(
            store.get_skill(&bob, &skill.id).await.unwrap_err(),
            ApiError::NotFound("skill")
        ));
        assert!(matches!(
            store
                .update_skill(&bob, &skill.id, &SkillPatch::default())
                .await
                .unwrap_err(),
            ApiError::NotFound("skill")
        ));
        assert!(matches!(
            store.delete_skill(&bob, &skill.id).await.unwrap_err(),
            ApiError::NotFound("skill")
        ));
        assert!(matches!(
            store.get_skill(&alice, "not-a-uuid").await.unwrap_err(),
            ApiError::NotFound("skill")
        ));
    }

    #[tokio::test]
    async fn list_scopes_and_filters() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let bob = user(&store, "bob@x.com").await;
        let research = sub_agent(&store, &alice, "researcher").await;
        let writing = sub_agent(&store, &alice, "writer").await;
        let bobs = sub_agent(&store, &bob, "rival").await;

        store.create_skill(&alice, &new_skill("search", research)).await.unwrap();
        store.create_skill(&alice, &new_skill("cite", research)).await.unwrap();
        store.create_skill(&alice, &new_skill("draft", writing)).await.unwrap();
        store.create_skill(&bob, &new_skill("spy", bobs)).await.unwrap();

        assert_eq!(store.list_skills(&alice, None).await.unwrap().len(), 3);
        assert_eq!(
            store.list_skills(&alice, Some(research)).await.unwrap().len(),
            2
        );
        // Filtering by someone else's sub-agent yields nothing
        assert!(store.list_skills(&alice, Some(bobs)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_repeat_delete() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let agent = sub_agent(&store, &alice, "researcher").await;
        let skill = store
            .create_skill(&alice, &new_skill("summarizing", agent))
            .await
            .unwrap();

        let updated = store
            .update_skill(
                &alice,
                &skill.id,
                &SkillPatch {
                    description: Some("condense long documents".into()),
                    ..SkillPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "summarizing");
        assert_eq!(
            updated.description.as_deref(),
            Some("condense long documents")
        );
        assert!(updated.updated_at > skill.updated_at);

        store.delete_skill(&alice, &skill.id).await.unwrap();
        assert!(matches!(
            store.delete_skill(&alice, &skill.id).await.unwrap_err(),
            ApiError::NotFound("skill")
        ));
    }
}
