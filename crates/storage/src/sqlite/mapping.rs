use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use study_core::model::{
    Priority, RecordId, StudySession, StudyTimeRecord, Subject, Task, User,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Maps a failed write, turning UNIQUE violations into `Conflict`.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => conn(e),
    }
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64<I: RecordId>(id: I) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("id overflow".into()))
}

pub(crate) fn opt_id_to_i64<I: RecordId>(id: Option<I>) -> Result<Option<i64>, StorageError> {
    id.map(id_to_i64).transpose()
}

/// ID assigned by the last INSERT.
pub(crate) fn inserted_id<I: RecordId>(rowid: i64) -> Result<I, StorageError> {
    Ok(I::from_value(i64_to_u64("rowid", rowid)?))
}

fn id_column<I: RecordId>(row: &SqliteRow, column: &'static str) -> Result<I, StorageError> {
    let raw: i64 = row.try_get(column).map_err(ser)?;
    Ok(I::from_value(i64_to_u64(column, raw)?))
}

fn opt_id_column<I: RecordId>(
    row: &SqliteRow,
    column: &'static str,
) -> Result<Option<I>, StorageError> {
    row.try_get::<Option<i64>, _>(column)
        .map_err(ser)?
        .map(|raw| i64_to_u64(column, raw).map(I::from_value))
        .transpose()
}

fn opt_u32_column(row: &SqliteRow, column: &'static str) -> Result<Option<u32>, StorageError> {
    row.try_get::<Option<i64>, _>(column)
        .map_err(ser)?
        .map(|raw| {
            u32::try_from(raw)
                .map_err(|_| StorageError::Serialization(format!("invalid {column}: {raw}")))
        })
        .transpose()
}

fn flag_column(row: &SqliteRow, column: &'static str) -> Result<bool, StorageError> {
    Ok(row.try_get::<i64, _>(column).map_err(ser)? != 0)
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: id_column(row, "id")?,
        username: row.try_get("username").map_err(ser)?,
        password: row.try_get("password").map_err(ser)?,
        first_name: row.try_get("first_name").map_err(ser)?,
        last_name: row.try_get("last_name").map_err(ser)?,
        email: row.try_get("email").map_err(ser)?,
    })
}

pub(crate) fn map_subject_row(row: &SqliteRow) -> Result<Subject, StorageError> {
    Ok(Subject {
        id: id_column(row, "id")?,
        user_id: id_column(row, "user_id")?,
        name: row.try_get("name").map_err(ser)?,
        color: row.try_get("color").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
    })
}

pub(crate) fn map_task_row(row: &SqliteRow) -> Result<Task, StorageError> {
    let priority: String = row.try_get("priority").map_err(ser)?;
    Ok(Task {
        id: id_column(row, "id")?,
        user_id: id_column(row, "user_id")?,
        subject_id: id_column(row, "subject_id")?,
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        priority: priority.parse::<Priority>().map_err(ser)?,
        due_date: row.try_get("due_date").map_err(ser)?,
        estimated_time: opt_u32_column(row, "estimated_time")?,
        completed: flag_column(row, "completed")?,
    })
}

pub(crate) fn map_study_session_row(row: &SqliteRow) -> Result<StudySession, StorageError> {
    Ok(StudySession {
        id: id_column(row, "id")?,
        user_id: id_column(row, "user_id")?,
        subject_id: id_column(row, "subject_id")?,
        title: row.try_get("title").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        location: row.try_get("location").map_err(ser)?,
        start_time: row.try_get("start_time").map_err(ser)?,
        end_time: row.try_get("end_time").map_err(ser)?,
        date: row.try_get("date").map_err(ser)?,
        completed: flag_column(row, "completed")?,
        participants: opt_u32_column(row, "participants")?,
    })
}

pub(crate) fn map_time_record_row(row: &SqliteRow) -> Result<StudyTimeRecord, StorageError> {
    let duration: i64 = row.try_get("duration").map_err(ser)?;
    let focus_score = row
        .try_get::<Option<i64>, _>("focus_score")
        .map_err(ser)?
        .map(|raw| {
            u8::try_from(raw)
                .map_err(|_| StorageError::Serialization(format!("invalid focus_score: {raw}")))
        })
        .transpose()?;
    Ok(StudyTimeRecord {
        id: id_column(row, "id")?,
        user_id: id_column(row, "user_id")?,
        subject_id: id_column(row, "subject_id")?,
        task_id: opt_id_column(row, "task_id")?,
        date: row.try_get("date").map_err(ser)?,
        duration: u32::try_from(duration)
            .map_err(|_| StorageError::Serialization(format!("invalid duration: {duration}")))?,
        focus_score,
    })
}
