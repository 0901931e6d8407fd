use study_core::model::{NewTask, Record, Task, TaskId, TaskPatch, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, inserted_id, map_task_row};
use crate::repository::{RecordRepository, StorageError};

const COLUMNS: &str =
    "id, user_id, subject_id, title, description, priority, due_date, estimated_time, completed";

impl SqliteRepository {
    async fn write_task(&self, task: &Task) -> Result<(), StorageError> {
        sqlx::query(
            r"
            UPDATE tasks
            SET user_id = ?2, subject_id = ?3, title = ?4, description = ?5,
                priority = ?6, due_date = ?7, estimated_time = ?8, completed = ?9
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64(task.id)?)
        .bind(id_to_i64(task.user_id)?)
        .bind(id_to_i64(task.subject_id)?)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.estimated_time.map(i64::from))
        .bind(i64::from(task.completed))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordRepository<Task> for SqliteRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Task>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY id ASC"
        ))
        .bind(id_to_i64(user_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_task_row).collect()
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>, StorageError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1"))
            .bind(id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_task_row).transpose()
    }

    async fn create(&self, draft: NewTask) -> Result<Task, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO tasks (user_id, subject_id, title, description, priority, due_date, estimated_time, completed)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(id_to_i64(draft.user_id)?)
        .bind(id_to_i64(draft.subject_id)?)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.priority.as_str())
        .bind(draft.due_date)
        .bind(draft.estimated_time.map(i64::from))
        .bind(i64::from(draft.completed))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(Task::from_draft(inserted_id(res.last_insert_rowid())?, draft))
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Option<Task>, StorageError> {
        let Some(mut task) = RecordRepository::<Task>::get(self, id).await? else {
            return Ok(None);
        };
        task.apply_patch(patch);
        self.write_task(&task).await?;
        Ok(Some(task))
    }

    async fn delete(&self, id: TaskId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }
}
