use study_core::model::{NewSubject, Record, Subject, SubjectId, SubjectPatch, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, inserted_id, map_subject_row};
use crate::repository::{RecordRepository, StorageError};

const COLUMNS: &str = "id, user_id, name, color, description";

impl SqliteRepository {
    async fn write_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        sqlx::query(
            r"
            UPDATE subjects
            SET user_id = ?2, name = ?3, color = ?4, description = ?5
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64(subject.id)?)
        .bind(id_to_i64(subject.user_id)?)
        .bind(&subject.name)
        .bind(&subject.color)
        .bind(&subject.description)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordRepository<Subject> for SqliteRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Subject>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM subjects WHERE user_id = ?1 ORDER BY id ASC"
        ))
        .bind(id_to_i64(user_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_subject_row).collect()
    }

    async fn get(&self, id: SubjectId) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM subjects WHERE id = ?1"))
            .bind(id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_subject_row).transpose()
    }

    async fn create(&self, draft: NewSubject) -> Result<Subject, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO subjects (user_id, name, color, description)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(id_to_i64(draft.user_id)?)
        .bind(&draft.name)
        .bind(&draft.color)
        .bind(&draft.description)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(Subject::from_draft(inserted_id(res.last_insert_rowid())?, draft))
    }

    async fn update(
        &self,
        id: SubjectId,
        patch: SubjectPatch,
    ) -> Result<Option<Subject>, StorageError> {
        let Some(mut subject) = RecordRepository::<Subject>::get(self, id).await? else {
            return Ok(None);
        };
        subject.apply_patch(patch);
        self.write_subject(&subject).await?;
        Ok(Some(subject))
    }

    async fn delete(&self, id: SubjectId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM subjects WHERE id = ?1")
            .bind(id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }
}
