use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use study_core::model::{
    NewUser, Record, RecordId, StudySession, StudyTimeRecord, Subject, Task, User, UserId,
};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// CRUD contract shared by every user-owned record type.
#[async_trait]
pub trait RecordRepository<R: Record>: Send + Sync {
    /// All records owned by `user_id`, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<R>, StorageError>;

    /// Fetch a record by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, id: R::Id) -> Result<Option<R>, StorageError>;

    /// Store a new record under the next free ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn create(&self, draft: R::Draft) -> Result<R, StorageError>;

    /// Merge `patch` into an existing record.
    ///
    /// Returns `Ok(None)` when no record has that ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or written.
    async fn update(&self, id: R::Id, patch: R::Patch) -> Result<Option<R>, StorageError>;

    /// Remove a record. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn delete(&self, id: R::Id) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Store a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;
}

/// Study-time records additionally support date-range queries.
#[async_trait]
pub trait TimeRecordRepository: RecordRepository<StudyTimeRecord> {
    /// Records for `user_id` dated within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StudyTimeRecord>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// One auto-incrementing map per record type.
struct Table<R: Record> {
    next_id: u64,
    rows: BTreeMap<R::Id, R>,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<R: Record> Table<R> {
    fn list_for_user(&self, user_id: UserId) -> Vec<R> {
        self.rows
            .values()
            .filter(|r| r.owner() == user_id)
            .cloned()
            .collect()
    }

    fn create(&mut self, draft: R::Draft) -> R {
        let id = R::Id::from_value(self.next_id);
        self.next_id += 1;
        let record = R::from_draft(id, draft);
        self.rows.insert(id, record.clone());
        record
    }

    fn update(&mut self, id: R::Id, patch: R::Patch) -> Option<R> {
        let record = self.rows.get_mut(&id)?;
        record.apply_patch(patch);
        Some(record.clone())
    }
}

#[derive(Default)]
struct UserTable {
    next_id: u64,
    rows: BTreeMap<UserId, User>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<UserTable>>,
    subjects: Arc<Mutex<Table<Subject>>>,
    tasks: Arc<Mutex<Table<Task>>>,
    study_sessions: Arc<Mutex<Table<StudySession>>>,
    time_records: Arc<Mutex<Table<StudyTimeRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

macro_rules! memory_record_repository {
    ($record:ty, $field:ident) => {
        #[async_trait]
        impl RecordRepository<$record> for InMemoryRepository {
            async fn list_for_user(&self, user_id: UserId) -> Result<Vec<$record>, StorageError> {
                let guard = self.$field.lock().map_err(poisoned)?;
                Ok(guard.list_for_user(user_id))
            }

            async fn get(
                &self,
                id: <$record as Record>::Id,
            ) -> Result<Option<$record>, StorageError> {
                let guard = self.$field.lock().map_err(poisoned)?;
                Ok(guard.rows.get(&id).cloned())
            }

            async fn create(
                &self,
                draft: <$record as Record>::Draft,
            ) -> Result<$record, StorageError> {
                let mut guard = self.$field.lock().map_err(poisoned)?;
                Ok(guard.create(draft))
            }

            async fn update(
                &self,
                id: <$record as Record>::Id,
                patch: <$record as Record>::Patch,
            ) -> Result<Option<$record>, StorageError> {
                let mut guard = self.$field.lock().map_err(poisoned)?;
                Ok(guard.update(id, patch))
            }

            async fn delete(&self, id: <$record as Record>::Id) -> Result<bool, StorageError> {
                let mut guard = self.$field.lock().map_err(poisoned)?;
                Ok(guard.rows.remove(&id).is_some())
            }
        }
    };
}

memory_record_repository!(Subject, subjects);
memory_record_repository!(Task, tasks);
memory_record_repository!(StudySession, study_sessions);
memory_record_repository!(StudyTimeRecord, time_records);

#[async_trait]
impl TimeRecordRepository for InMemoryRepository {
    async fn list_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StudyTimeRecord>, StorageError> {
        let guard = self.time_records.lock().map_err(poisoned)?;
        Ok(guard
            .list_for_user(user_id)
            .into_iter()
            .filter(|r| start <= r.date && r.date <= end)
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let guard = self.users.lock().map_err(poisoned)?;
        Ok(guard.rows.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut guard = self.users.lock().map_err(poisoned)?;
        if guard
            .rows
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StorageError::Conflict);
        }
        guard.next_id += 1;
        let id = UserId::new(guard.next_id);
        let user = User::from_new(id, user);
        guard.rows.insert(id, user.clone());
        Ok(user)
    }
}

/// Aggregates the per-record repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub subjects: Arc<dyn RecordRepository<Subject>>,
    pub tasks: Arc<dyn RecordRepository<Task>>,
    pub study_sessions: Arc<dyn RecordRepository<StudySession>>,
    pub time_records: Arc<dyn TimeRecordRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            users: Arc::new(repo.clone()),
            subjects: Arc::new(repo.clone()),
            tasks: Arc::new(repo.clone()),
            study_sessions: Arc::new(repo.clone()),
            time_records: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::{
        NewStudyTimeRecord, NewSubject, NewTask, Priority, SubjectId, SubjectPatch, TaskId,
        TaskPatch,
    };

    fn new_subject(user: u64, name: &str) -> NewSubject {
        NewSubject {
            user_id: UserId::new(user),
            name: name.into(),
            color: "blue".into(),
            description: None,
        }
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            user_id: UserId::new(1),
            subject_id: SubjectId::new(1),
            title: title.into(),
            description: None,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            estimated_time: Some(45),
            completed: false,
        }
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: "pw".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn ids_auto_increment_per_record_type() {
        let repo = InMemoryRepository::new();
        let a = RecordRepository::<Subject>::create(&repo, new_subject(1, "Math"))
            .await
            .unwrap();
        let b = RecordRepository::<Subject>::create(&repo, new_subject(1, "Art"))
            .await
            .unwrap();
        let t = RecordRepository::<Task>::create(&repo, new_task("Essay"))
            .await
            .unwrap();

        assert_eq!(a.id, SubjectId::new(1));
        assert_eq!(b.id, SubjectId::new(2));
        assert_eq!(t.id, TaskId::new(1));
    }

    #[tokio::test]
    async fn list_filters_by_owner() {
        let repo = InMemoryRepository::new();
        for (user, name) in [(1, "Math"), (2, "Chem"), (1, "Art")] {
            RecordRepository::<Subject>::create(&repo, new_subject(user, name))
                .await
                .unwrap();
        }
        let names: Vec<String> = RecordRepository::<Subject>::list_for_user(&repo, UserId::new(1))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Math", "Art"]);
    }

    #[tokio::test]
    async fn update_merges_and_reports_missing() {
        let repo = InMemoryRepository::new();
        let task = RecordRepository::<Task>::create(&repo, new_task("Lab report"))
            .await
            .unwrap();

        let updated = RecordRepository::<Task>::update(&repo, task.id, TaskPatch::completed(true))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Lab report");
        assert_eq!(updated.estimated_time, Some(45));

        let missing = RecordRepository::<Subject>::update(
            &repo,
            SubjectId::new(99),
            SubjectPatch::default(),
        )
        .await
        .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let repo = InMemoryRepository::new();
        let subject = RecordRepository::<Subject>::create(&repo, new_subject(1, "Math"))
            .await
            .unwrap();
        assert!(RecordRepository::<Subject>::delete(&repo, subject.id).await.unwrap());
        assert!(!RecordRepository::<Subject>::delete(&repo, subject.id).await.unwrap());
        assert!(RecordRepository::<Subject>::get(&repo, subject.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn users_are_unique_by_username() {
        let repo = InMemoryRepository::new();
        let first = repo.create_user(new_user("ada", "ada@x.io")).await.unwrap();
        assert_eq!(first.id, UserId::new(1));
        assert!(matches!(
            repo.create_user(new_user("ada", "other@x.io")).await,
            Err(StorageError::Conflict)
        ));
        let found = repo.find_by_username("ada").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(repo.get_user(UserId::new(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn time_records_filter_by_inclusive_range() {
        let storage = Storage::in_memory();
        for day in [1, 5, 9] {
            storage
                .time_records
                .create(NewStudyTimeRecord {
                    user_id: UserId::new(1),
                    subject_id: SubjectId::new(1),
                    task_id: None,
                    date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                    duration: 30,
                    focus_score: None,
                })
                .await
                .unwrap();
        }
        let hits = storage
            .time_records
            .list_in_range(
                UserId::new(1),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }
}
