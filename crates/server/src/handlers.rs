use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use storage::repository::{RecordRepository, Storage};
use study_core::model::{
    NewStudyTimeRecord, NewUser, Record, RecordId, StudySession, StudyTimeRecord, Subject, Task,
    User, UserId, Validate,
};

use crate::error::ServerError;
use crate::state::AppState;

/// A record type served by the generic CRUD handlers.
pub(crate) trait RoutedRecord: Record {
    /// Name used in `"<label> not found"` messages.
    const LABEL: &'static str;

    fn repository(storage: &Storage) -> Arc<dyn RecordRepository<Self>>;
}

impl RoutedRecord for Subject {
    const LABEL: &'static str = "Subject";

    fn repository(storage: &Storage) -> Arc<dyn RecordRepository<Self>> {
        Arc::clone(&storage.subjects)
    }
}

impl RoutedRecord for Task {
    const LABEL: &'static str = "Task";

    fn repository(storage: &Storage) -> Arc<dyn RecordRepository<Self>> {
        Arc::clone(&storage.tasks)
    }
}

impl RoutedRecord for StudySession {
    const LABEL: &'static str = "Study session";

    fn repository(storage: &Storage) -> Arc<dyn RecordRepository<Self>> {
        Arc::clone(&storage.study_sessions)
    }
}

//
// ─── EXTRACTION HELPERS ────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct UserQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RangeQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

fn parse_user_id(raw: Option<&str>) -> Result<UserId, ServerError> {
    raw.and_then(|v| v.trim().parse::<UserId>().ok())
        .ok_or_else(|| ServerError::BadRequest("Invalid user ID".into()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ServerError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ServerError::BadRequest(format!("Invalid date: {raw}")))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

fn path_id<I: RecordId>(path: Result<Path<u64>, PathRejection>) -> Result<I, ServerError> {
    path.map(|Path(raw)| I::from_value(raw))
        .map_err(|_| ServerError::BadRequest("Invalid ID".into()))
}

//
// ─── USERS ─────────────────────────────────────────────────────────────────────
//

pub(crate) async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    let new_user = body(payload)?;
    new_user.validate()?;

    let users = &state.storage.users;
    if users.find_by_username(&new_user.username).await?.is_some() {
        return Err(ServerError::Conflict("Username already exists".into()));
    }
    let user = users.create_user(new_user).await.map_err(|e| match e {
        storage::repository::StorageError::Conflict => {
            ServerError::Conflict("Username or email already exists".into())
        }
        other => other.into(),
    })?;
    tracing::info!(user_id = %user.id, "created user");
    Ok((StatusCode::CREATED, Json(user)))
}

pub(crate) async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<User>, ServerError> {
    let id: UserId = path_id(path)?;
    state
        .storage
        .users
        .get_user(id)
        .await?
        .map(Json)
        .ok_or(ServerError::NotFound("User"))
}

//
// ─── GENERIC RECORDS ───────────────────────────────────────────────────────────
//

pub(crate) async fn list<R: RoutedRecord>(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<R>>, ServerError> {
    let user_id = parse_user_id(query.user_id.as_deref())?;
    let records = R::repository(&state.storage).list_for_user(user_id).await?;
    Ok(Json(records))
}

pub(crate) async fn create<R: RoutedRecord>(
    State(state): State<AppState>,
    payload: Result<Json<R::Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ServerError> {
    let draft = body(payload)?;
    draft.validate()?;
    let record = R::repository(&state.storage).create(draft).await?;
    tracing::debug!(kind = R::LABEL, id = %record.id(), "created record");
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn update<R: RoutedRecord>(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<R>, ServerError> {
    let id: R::Id = path_id(path)?;
    let patch = body(payload)?;
    patch.validate()?;
    R::repository(&state.storage)
        .update(id, patch)
        .await?
        .map(Json)
        .ok_or(ServerError::NotFound(R::LABEL))
}

pub(crate) async fn remove<R: RoutedRecord>(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let id: R::Id = path_id(path)?;
    if R::repository(&state.storage).delete(id).await? {
        tracing::debug!(kind = R::LABEL, %id, "deleted record");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound(R::LABEL))
    }
}

//
// ─── STUDY TIME RECORDS ────────────────────────────────────────────────────────
//

pub(crate) async fn list_time_records(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<StudyTimeRecord>>, ServerError> {
    let user_id = parse_user_id(query.user_id.as_deref())?;
    let repo = &state.storage.time_records;
    let records = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => {
            repo.list_in_range(user_id, parse_date(start)?, parse_date(end)?)
                .await?
        }
        _ => repo.list_for_user(user_id).await?,
    };
    Ok(Json(records))
}

pub(crate) async fn create_time_record(
    State(state): State<AppState>,
    payload: Result<Json<NewStudyTimeRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<StudyTimeRecord>), ServerError> {
    let draft = body(payload)?;
    draft.validate()?;
    let record = state.storage.time_records.create(draft).await?;
    tracing::debug!(id = %record.id, minutes = record.duration, "logged study time");
    Ok((StatusCode::CREATED, Json(record)))
}
