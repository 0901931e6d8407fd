//! Entity-specific queries over synced collections.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use study_core::Notification;
use study_core::model::{
    StudySession, StudyTimeRecord, Subject, SubjectId, Task, TaskId, User,
};
use study_core::stats::{self, DashboardStats};
use study_core::time::DateRange;

use crate::sync::SyncedCollection;

const UPCOMING_DEADLINES: usize = 3;

//
// ─── TASKS ─────────────────────────────────────────────────────────────────────
//

impl SyncedCollection<Task> {
    /// Subject of `task_id`, or the "Unknown" placeholder when either the task
    /// or its subject is missing.
    #[must_use]
    pub fn subject_for_task(&self, task_id: TaskId, subjects: &[Subject]) -> Subject {
        let Some(task) = self.get(task_id) else {
            return Subject::unknown(self.user_id().unwrap_or_else(|| User::demo().id));
        };
        subjects
            .iter()
            .find(|s| s.id == task.subject_id)
            .cloned()
            .unwrap_or_else(|| Subject::unknown(task.user_id))
    }

    /// The three nearest incomplete tasks by due date.
    #[must_use]
    pub fn upcoming_deadlines(&self) -> Vec<Task> {
        stats::upcoming_deadlines(self.items(), UPCOMING_DEADLINES)
    }
}

//
// ─── SCHEDULE ──────────────────────────────────────────────────────────────────
//

impl SyncedCollection<StudySession> {
    #[must_use]
    pub fn today_sessions(&self, today: NaiveDate) -> Vec<StudySession> {
        self.sessions_by_date(today)
    }

    #[must_use]
    pub fn sessions_by_date(&self, date: NaiveDate) -> Vec<StudySession> {
        stats::sessions_on(self.items(), date)
    }

    /// Signal that a focus session is about to begin.
    pub fn start_study_session(&self) {
        self.notifier().notify(Notification::info(
            "Study Session Started",
            "Timer is ready for your focus session",
        ));
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Study-time statistics as of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub week: DateRange,
    pub weekly_records: Vec<StudyTimeRecord>,
    pub monthly_records: Vec<StudyTimeRecord>,
    pub dashboard: DashboardStats,
    pub subject_distribution: BTreeMap<SubjectId, u32>,
    /// Minutes for each day of the current week, Sunday first.
    pub week_minutes: Vec<(NaiveDate, u32)>,
}

impl StudyStats {
    #[must_use]
    pub fn compute(records: &[StudyTimeRecord], tasks: &[Task], today: NaiveDate) -> Self {
        let week = DateRange::week_of(today);
        let month = DateRange::month_of(today);
        let owned = |range: DateRange| -> Vec<StudyTimeRecord> {
            stats::records_in_range(records, range)
                .into_iter()
                .cloned()
                .collect()
        };
        Self {
            week,
            weekly_records: owned(week),
            monthly_records: owned(month),
            dashboard: DashboardStats::compute(records, tasks, today),
            subject_distribution: stats::subject_distribution(records),
            week_minutes: stats::daily_minutes(records, week),
        }
    }
}

impl SyncedCollection<StudyTimeRecord> {
    #[must_use]
    pub fn stats(&self, tasks: &[Task], today: NaiveDate) -> StudyStats {
        StudyStats::compute(self.items(), tasks, today)
    }
}
