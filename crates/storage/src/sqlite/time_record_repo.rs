use chrono::NaiveDate;
use study_core::model::{
    NewStudyTimeRecord, Record, StudyTimeRecord, StudyTimeRecordPatch, TimeRecordId, UserId,
};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, inserted_id, map_time_record_row, opt_id_to_i64};
use crate::repository::{RecordRepository, StorageError, TimeRecordRepository};

const COLUMNS: &str = "id, user_id, subject_id, task_id, date, duration, focus_score";

impl SqliteRepository {
    async fn write_time_record(&self, record: &StudyTimeRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            UPDATE study_time_records
            SET user_id = ?2, subject_id = ?3, task_id = ?4, date = ?5, duration = ?6, focus_score = ?7
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64(record.id)?)
        .bind(id_to_i64(record.user_id)?)
        .bind(id_to_i64(record.subject_id)?)
        .bind(opt_id_to_i64(record.task_id)?)
        .bind(record.date)
        .bind(i64::from(record.duration))
        .bind(record.focus_score.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordRepository<StudyTimeRecord> for SqliteRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<StudyTimeRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM study_time_records WHERE user_id = ?1 ORDER BY id ASC"
        ))
        .bind(id_to_i64(user_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_time_record_row).collect()
    }

    async fn get(&self, id: TimeRecordId) -> Result<Option<StudyTimeRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM study_time_records WHERE id = ?1"
        ))
        .bind(id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_time_record_row).transpose()
    }

    async fn create(&self, draft: NewStudyTimeRecord) -> Result<StudyTimeRecord, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO study_time_records (user_id, subject_id, task_id, date, duration, focus_score)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(id_to_i64(draft.user_id)?)
        .bind(id_to_i64(draft.subject_id)?)
        .bind(opt_id_to_i64(draft.task_id)?)
        .bind(draft.date)
        .bind(i64::from(draft.duration))
        .bind(draft.focus_score.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(StudyTimeRecord::from_draft(
            inserted_id(res.last_insert_rowid())?,
            draft,
        ))
    }

    async fn update(
        &self,
        id: TimeRecordId,
        patch: StudyTimeRecordPatch,
    ) -> Result<Option<StudyTimeRecord>, StorageError> {
        let Some(mut record) = RecordRepository::<StudyTimeRecord>::get(self, id).await? else {
            return Ok(None);
        };
        record.apply_patch(patch);
        self.write_time_record(&record).await?;
        Ok(Some(record))
    }

    async fn delete(&self, id: TimeRecordId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM study_time_records WHERE id = ?1")
            .bind(id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl TimeRecordRepository for SqliteRepository {
    async fn list_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StudyTimeRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {COLUMNS} FROM study_time_records
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY id ASC
            "
        ))
        .bind(id_to_i64(user_id)?)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_time_record_row).collect()
    }
}
