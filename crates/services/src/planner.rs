use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use storage::local::LocalStore;
use study_core::Clock;
use study_core::model::{StudySession, StudyTimeRecord, Subject, Task, User};

use crate::api_client::{ApiClient, ApiConfig};
use crate::error::PlannerError;
use crate::notify::Notifier;
use crate::pomodoro::PomodoroService;
use crate::resource::Resource;
use crate::sync::SyncedCollection;
use crate::user::UserContext;
use crate::views::StudyStats;

/// Assembles the client-side services around one user.
pub struct Planner {
    clock: Clock,
    user: UserContext,
    subjects: SyncedCollection<Subject>,
    tasks: SyncedCollection<Task>,
    sessions: SyncedCollection<StudySession>,
    time_records: SyncedCollection<StudyTimeRecord>,
    pomodoro: Arc<PomodoroService>,
}

impl Planner {
    /// Planner cached under `data_dir`, talking to `api` when configured.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if the data directory cannot be created or the
    /// HTTP client cannot be built.
    pub fn open(
        data_dir: impl Into<PathBuf>,
        api: Option<ApiConfig>,
        notifier: Arc<dyn Notifier>,
        clock: Clock,
    ) -> Result<Self, PlannerError> {
        let local = LocalStore::open(data_dir)?;
        let api = ApiClient::new(api)?;
        Ok(Self::new(local, api, notifier, clock))
    }

    #[must_use]
    pub fn new(
        local: LocalStore,
        api: ApiClient,
        notifier: Arc<dyn Notifier>,
        clock: Clock,
    ) -> Self {
        Self {
            clock,
            subjects: collection(&api, &local, &notifier),
            tasks: collection(&api, &local, &notifier),
            sessions: collection(&api, &local, &notifier),
            time_records: collection(&api, &local, &notifier),
            pomodoro: Arc::new(PomodoroService::new(local.clone(), Arc::clone(&notifier))),
            user: UserContext::new(local),
        }
    }

    /// Load the stored user, then every collection for that user.
    pub async fn load(&mut self) {
        self.user.load();
        self.reload().await;
    }

    /// Switch to `user` and reload every collection.
    pub async fn switch_user(&mut self, user: User) {
        self.user.set_user(user);
        self.reload().await;
    }

    /// Return to the demo account and reload.
    pub async fn logout(&mut self) {
        self.user.logout();
        self.reload().await;
    }

    async fn reload(&mut self) {
        let user_id = Some(self.user.user().id);
        self.subjects.set_user(user_id);
        self.tasks.set_user(user_id);
        self.sessions.set_user(user_id);
        self.time_records.set_user(user_id);

        self.subjects.load().await;
        self.tasks.load().await;
        self.sessions.load().await;
        self.time_records.load().await;
        tracing::debug!(
            user_id = %self.user.user().id,
            subjects = self.subjects.items().len(),
            tasks = self.tasks.items().len(),
            sessions = self.sessions.items().len(),
            records = self.time_records.items().len(),
            "planner loaded"
        );
    }

    #[must_use]
    pub fn user(&self) -> &User {
        self.user.user()
    }

    #[must_use]
    pub fn subjects(&self) -> &SyncedCollection<Subject> {
        &self.subjects
    }

    pub fn subjects_mut(&mut self) -> &mut SyncedCollection<Subject> {
        &mut self.subjects
    }

    #[must_use]
    pub fn tasks(&self) -> &SyncedCollection<Task> {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut SyncedCollection<Task> {
        &mut self.tasks
    }

    #[must_use]
    pub fn sessions(&self) -> &SyncedCollection<StudySession> {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SyncedCollection<StudySession> {
        &mut self.sessions
    }

    #[must_use]
    pub fn time_records(&self) -> &SyncedCollection<StudyTimeRecord> {
        &self.time_records
    }

    pub fn time_records_mut(&mut self) -> &mut SyncedCollection<StudyTimeRecord> {
        &mut self.time_records
    }

    #[must_use]
    pub fn pomodoro(&self) -> Arc<PomodoroService> {
        Arc::clone(&self.pomodoro)
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Study statistics as of the planner clock's today.
    #[must_use]
    pub fn stats(&self) -> StudyStats {
        self.time_records.stats(self.tasks.items(), self.today())
    }

    /// Today's scheduled sessions.
    #[must_use]
    pub fn today_sessions(&self) -> Vec<StudySession> {
        self.sessions.today_sessions(self.today())
    }
}

fn collection<R: Resource>(
    api: &ApiClient,
    local: &LocalStore,
    notifier: &Arc<dyn Notifier>,
) -> SyncedCollection<R> {
    SyncedCollection::new(api.clone(), local.clone(), Arc::clone(notifier), None)
}
