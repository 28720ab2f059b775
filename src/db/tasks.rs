//! Tasks, scoped to their owning user
//!
//! Every lookup filters on `user_id`, so a task belonging to another user is
//! indistinguishable from one that does not exist.

use crate::db::{now, parse_id, NewTask, Store, TaskPatch, TaskRow};
use crate::types::{ApiError, Result};
use uuid::Uuid;

impl Store {
    pub async fn list_tasks(&self, owner: &str) -> Result<Vec<TaskRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM tasks WHERE user_id = ? ORDER BY created_at")
                .bind(owner)
                .fetch_all(self.pool())
                .await?,
        )
    }

    pub async fn create_task(&self, owner: &str, input: &NewTask) -> Result<TaskRow> {
        let id = Uuid::new_v4().to_string();
        let timestamp = now();

        sqlx::query(
            "INSERT INTO tasks (id, title, description, completed, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.completed)
        .bind(owner)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(self.pool())
        .await?;

        Ok(TaskRow {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            completed: input.completed,
            user_id: owner.to_string(),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    pub async fn get_task(&self, owner: &str, id: &str) -> Result<TaskRow> {
        let id = parse_id(id, "task")?;

        sqlx::query_as("SELECT * FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(self.pool())
            .await?
            .ok_or(ApiError::NotFound("task"))
    }

    /// Apply a partial update. Absent fields keep their stored values; the
    /// update timestamp always refreshes.
    pub async fn update_task(&self, owner: &str, id: &str, patch: &TaskPatch) -> Result<TaskRow> {
        let id = parse_id(id, "task")?;
        let mut tx = self.pool().begin().await?;

        let existing: Option<TaskRow> =
            sqlx::query_as("SELECT * FROM tasks WHERE id = ? AND user_id = ?")
                .bind(id.to_string())
                .bind(owner)
                .fetch_optional(&mut *tx)
                .await?;
        let task = existing.ok_or(ApiError::NotFound("task"))?;

        let title = patch.title.clone().unwrap_or_else(|| task.title.clone());
        let description = patch.description.clone().or_else(|| task.description.clone());
        let completed = patch.completed.unwrap_or(task.completed);
        let updated_at = now();

        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, completed = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&title)
        .bind(&description)
        .bind(completed)
        .bind(&updated_at)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(TaskRow {
            title,
            description,
            completed,
            updated_at,
            ..task
        })
    }

    /// Set the completion flag to an explicit value and refresh the update
    /// timestamp.
    pub async fn set_task_completed(
        &self,
        owner: &str,
        id: &str,
        completed: bool,
    ) -> Result<TaskRow> {
        self.update_task(
            owner,
            id,
            &TaskPatch {
                completed: Some(completed),
                ..TaskPatch::default()
            },
        )
        .await
    }

    pub async fn delete_task(&self, owner: &str, id: &str) -> Result<()> {
        let id = parse_id(id, "task")?;

        let deleted = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(owner)
            .execute(self.pool())
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::NotFound("task"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_store;

    async fn user(store: &Store, email: &str) -> String {
        store.create_user(email, "digest").await.unwrap().id
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
            completed: false,
        }
    }

    #[tokio::test]
    async fn create_and_list_are_owner_scoped() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let bob = user(&store, "bob@x.com").await;

        let task = store.create_task(&alice, &new_task("Buy milk")).await.unwrap();
        assert!(!task.completed);
        assert_eq!(task.user_id, alice);

        assert_eq!(store.list_tasks(&alice).await.unwrap().len(), 1);
        assert!(store.list_tasks(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_and_malformed_ids_both_read_as_not_found() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let bob = user(&store, "bob@x.com").await;
        let task = store.create_task(&alice, &new_task("secret")).await.unwrap();

        // Bob cannot observe Alice's task through any operation
        assert!(matches!(
            store.get_task(&bob, &task.id).await.unwrap_err(),
            ApiError::NotFound("task")
        ));
        assert!(matches!(
            store
                .update_task(&bob, &task.id, &TaskPatch::default())
                .await
                .unwrap_err(),
            ApiError::NotFound("task")
        ));
        assert!(matches!(
            store.delete_task(&bob, &task.id).await.unwrap_err(),
            ApiError::NotFound("task")
        ));

        // Malformed ids are indistinguishable from absent rows
        assert!(matches!(
            store.get_task(&alice, "not-a-uuid").await.unwrap_err(),
            ApiError::NotFound("task")
        ));

        // The owner still sees it
        assert_eq!(store.get_task(&alice, &task.id).await.unwrap().id, task.id);
    }

    #[tokio::test]
    async fn partial_update_leaves_absent_fields_alone() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let task = store
            .create_task(
                &alice,
                &NewTask {
                    title: "Write report".into(),
                    description: Some("quarterly".into()),
                    completed: false,
                },
            )
            .await
            .unwrap();

        let updated = store
            .update_task(
                &alice,
                &task.id,
                &TaskPatch {
                    title: Some("Write annual report".into()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Write annual report");
        assert_eq!(updated.description.as_deref(), Some("quarterly"));
        assert!(!updated.completed);
        assert!(updated.updated_at > task.updated_at);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn toggle_sets_explicit_value_and_refreshes_timestamp() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let task = store.create_task(&alice, &new_task("Buy milk")).await.unwrap();

        let done = store
            .set_task_completed(&alice, &task.id, true)
            .await
            .unwrap();
        assert!(done.completed);
        assert!(done.updated_at > task.updated_at);

        // Setting the same value again is not a bit-flip
        let still_done = store
            .set_task_completed(&alice, &task.id, true)
            .await
            .unwrap();
        assert!(still_done.completed);
    }

    #[tokio::test]
    async fn delete_task_twice_returns_not_found() {
        let store = test_store().await;
        let alice = user(&store, "alice@x.com").await;
        let task = store.create_task(&alice, &new_task("once")).await.unwrap();

        store.delete_task(&alice, &task.id).await.unwrap();
        assert!(matches!(
            store.delete_task(&alice, &task.id).await.unwrap_err(),
            ApiError::NotFound("task")
        ));
    }
}
