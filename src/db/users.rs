//! User accounts
//!
//! Email uniqueness is enforced by the store's UNIQUE constraint; the losing
//! side of a concurrent signup observes a Conflict rather than a crash or a
//! silent overwrite.

use uuid::Uuid;

use crate::db::{conflict_on_unique, now, Store, UserRow};
use crate::types::{ApiError, Result};

impl Store {
    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<UserRow> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(email)
            .bind(password_hash)
            .bind(&created_at)
            .execute(self.pool())
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))?;

        Ok(UserRow {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?)
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?)
    }

    /// Delete a user and everything they own: tasks, sub-agents, and the
    /// skills under those sub-agents, all in one transaction.
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        let id = id.to_string();
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "DELETE FROM skills WHERE sub_agent_id IN (SELECT id FROM sub_agents WHERE user_id = ?)",
        )
        .bind(&id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM sub_agents WHERE user_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE user_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::NotFound("user"));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_store;

    #[tokio::test]
    async fn signup_once_per_email() {
        let store = test_store().await;

        let user = store.create_user("a@x.com", "digest-1").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert!(Uuid::parse_str(&user.id).is_ok());

        let err = store.create_user("a@x.com", "digest-2").await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn lookup_by_email_and_id() {
        let store = test_store().await;

        let user = store.create_user("b@x.com", "digest").await.unwrap();
        let by_email = store.find_user_by_email("b@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password_hash, "digest");

        let by_id = store
            .find_user_by_id(Uuid::parse_str(&user.id).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id.email, "b@x.com");

        assert!(store.find_user_by_email("nobody@x.com").await.unwrap().is_none());
        assert!(store.find_user_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_user_cascades_to_owned_trees() {
        let store = test_store().await;

        let user = store.create_user("c@x.com", "digest").await.unwrap();
        store
            .create_task(
                &user.id,
                &crate::db::NewTask {
                    title: "t".into(),
                    description: None,
                    completed: false,
                },
            )
            .await
            .unwrap();
        let agent = store
            .create_sub_agent(
                &user.id,
                &crate::db::NewSubAgent {
                    name: "agent".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        store
            .create_skill(
                &user.id,
                &crate::db::NewSkill {
                    name: "skill".into(),
                    description: None,
                    sub_agent_id: Uuid::parse_str(&agent.id).unwrap(),
                },
            )
            .await
            .unwrap();

        let user_id = Uuid::parse_str(&user.id).unwrap();
        store.delete_user(user_id).await.unwrap();

        assert!(store.find_user_by_id(user_id).await.unwrap().is_none());
        // Second delete is NotFound, same as every other entity
        assert!(matches!(
            store.delete_user(user_id).await.unwrap_err(),
            ApiError::NotFound("user")
        ));
    }
}
