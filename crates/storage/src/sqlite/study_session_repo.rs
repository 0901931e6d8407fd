use study_core::model::{
    NewStudySession, Record, StudySession, StudySessionId, StudySessionPatch, UserId,
};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, inserted_id, map_study_session_row};
use crate::repository::{RecordRepository, StorageError};

const COLUMNS: &str = "id, user_id, subject_id, title, description, location, start_time, end_time, date, completed, participants";

impl SqliteRepository {
    async fn write_study_session(&self, session: &StudySession) -> Result<(), StorageError> {
        sqlx::query(
            r"
            UPDATE study_sessions
            SET user_id = ?2, subject_id = ?3, title = ?4, description = ?5, location = ?6,
                start_time = ?7, end_time = ?8, date = ?9, completed = ?10, participants = ?11
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64(session.id)?)
        .bind(id_to_i64(session.user_id)?)
        .bind(id_to_i64(session.subject_id)?)
        .bind(&session.title)
        .bind(&session.description)
        .bind(&session.location)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.date)
        .bind(i64::from(session.completed))
        .bind(session.participants.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordRepository<StudySession> for SqliteRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<StudySession>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM study_sessions WHERE user_id = ?1 ORDER BY id ASC"
        ))
        .bind(id_to_i64(user_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_study_session_row).collect()
    }

    async fn get(&self, id: StudySessionId) -> Result<Option<StudySession>, StorageError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM study_sessions WHERE id = ?1"))
            .bind(id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_study_session_row).transpose()
    }

    async fn create(&self, draft: NewStudySession) -> Result<StudySession, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO study_sessions
                (user_id, subject_id, title, description, location, start_time, end_time, date, completed, participants)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(id_to_i64(draft.user_id)?)
        .bind(id_to_i64(draft.subject_id)?)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.location)
        .bind(draft.start_time)
        .bind(draft.end_time)
        .bind(draft.date)
        .bind(i64::from(draft.completed))
        .bind(draft.participants.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(StudySession::from_draft(
            inserted_id(res.last_insert_rowid())?,
            draft,
        ))
    }

    async fn update(
        &self,
        id: StudySessionId,
        patch: StudySessionPatch,
    ) -> Result<Option<StudySession>, StorageError> {
        let Some(mut session) = RecordRepository::<StudySession>::get(self, id).await? else {
            return Ok(None);
        };
        session.apply_patch(patch);
        self.write_study_session(&session).await?;
        Ok(Some(session))
    }

    async fn delete(&self, id: StudySessionId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM study_sessions WHERE id = ?1")
            .bind(id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }
}
