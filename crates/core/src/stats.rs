//! Progress statistics over study-time records and tasks.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::{StudySession, StudyTimeRecord, SubjectId, Task};
use crate::time::{DateRange, format_hours_minutes};

/// Records whose date falls inside `range`.
#[must_use]
pub fn records_in_range<'a>(
    records: &'a [StudyTimeRecord],
    range: DateRange,
) -> Vec<&'a StudyTimeRecord> {
    records.iter().filter(|r| range.contains(r.date)).collect()
}

/// Total minutes studied on `day`.
#[must_use]
pub fn minutes_on(records: &[StudyTimeRecord], day: NaiveDate) -> u32 {
    records
        .iter()
        .filter(|r| r.date == day)
        .map(|r| r.duration)
        .sum()
}

/// Minutes per day for every day of `range`, zero-filled.
#[must_use]
pub fn daily_minutes(records: &[StudyTimeRecord], range: DateRange) -> Vec<(NaiveDate, u32)> {
    range.days().map(|d| (d, minutes_on(records, d))).collect()
}

/// Consecutive study days ending today, or ending yesterday if nothing was
/// logged today yet.
#[must_use]
pub fn study_streak(records: &[StudyTimeRecord], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    if days.is_empty() {
        return 0;
    }

    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Rounded mean of the recorded focus scores.
///
/// Records without a score, or with a score of zero, are left out.
#[must_use]
pub fn average_focus_score(records: &[StudyTimeRecord]) -> Option<u32> {
    let scores: Vec<u32> = records
        .iter()
        .filter_map(|r| r.focus_score)
        .filter(|s| *s > 0)
        .map(u32::from)
        .collect();
    if scores.is_empty() {
        return None;
    }
    let len = u32::try_from(scores.len()).unwrap_or(u32::MAX);
    let sum: u32 = scores.iter().sum();
    Some((sum + len / 2) / len)
}

/// Minutes studied per subject.
#[must_use]
pub fn subject_distribution(records: &[StudyTimeRecord]) -> BTreeMap<SubjectId, u32> {
    let mut distribution = BTreeMap::new();
    for record in records {
        *distribution.entry(record.subject_id).or_insert(0) += record.duration;
    }
    distribution
}

//
// ─── TASK COMPLETION ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskCompletion {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

impl TaskCompletion {
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        let total = tasks.len();
        let percentage = if total == 0 {
            0
        } else {
            let pct = (completed as f64 / total as f64 * 100.0).round();
            // Bounded to 0..=100 by construction.
            pct as u32
        };
        Self {
            completed,
            total,
            percentage,
        }
    }
}

impl fmt::Display for TaskCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)
    }
}

//
// ─── DASHBOARD ─────────────────────────────────────────────────────────────────
//

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_minutes: u32,
    pub tasks: TaskCompletion,
    pub streak: u32,
    pub focus_score: Option<u32>,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(records: &[StudyTimeRecord], tasks: &[Task], today: NaiveDate) -> Self {
        Self {
            today_minutes: minutes_on(records, today),
            tasks: TaskCompletion::of(tasks),
            streak: study_streak(records, today),
            focus_score: average_focus_score(records),
        }
    }

    /// Today's study time as `1h 30m`.
    #[must_use]
    pub fn today_study_time(&self) -> String {
        format_hours_minutes(self.today_minutes)
    }

    /// Average focus as `85%`, or `N/A` without scores.
    #[must_use]
    pub fn focus_score_label(&self) -> String {
        self.focus_score
            .map_or_else(|| "N/A".to_string(), |s| format!("{s}%"))
    }
}

//
// ─── SCHEDULE ──────────────────────────────────────────────────────────────────
//

/// Sessions scheduled on `day`.
#[must_use]
pub fn sessions_on(sessions: &[StudySession], day: NaiveDate) -> Vec<StudySession> {
    sessions.iter().filter(|s| s.date == day).cloned().collect()
}

/// The `limit` nearest incomplete tasks by due date.
#[must_use]
pub fn upcoming_deadlines(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut open: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
    open.sort_by_key(|t| t.due_date);
    open.truncate(limit);
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, TaskId, TimeRecordId, UserId};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn record(id: u64, day: u32, minutes: u32, subject: u64, score: Option<u8>) -> StudyTimeRecord {
        StudyTimeRecord {
            id: TimeRecordId::new(id),
            user_id: UserId::new(1),
            subject_id: SubjectId::new(subject),
            task_id: None,
            date: date(day),
            duration: minutes,
            focus_score: score,
        }
    }

    fn task(id: u64, due: u32, completed: bool) -> Task {
        Task {
            id: TaskId::new(id),
            user_id: UserId::new(1),
            subject_id: SubjectId::new(1),
            title: format!("Task {id}"),
            description: None,
            priority: Priority::Medium,
            due_date: date(due),
            estimated_time: None,
            completed,
        }
    }

    #[test]
    fn streak_counts_back_from_today() {
        let records = vec![
            record(1, 10, 30, 1, None),
            record(2, 9, 30, 1, None),
            record(3, 8, 30, 1, None),
            record(4, 6, 30, 1, None),
        ];
        assert_eq!(study_streak(&records, date(10)), 3);
    }

    #[test]
    fn streak_may_end_yesterday() {
        let records = vec![record(1, 9, 30, 1, None), record(2, 8, 30, 1, None)];
        assert_eq!(study_streak(&records, date(10)), 2);
        assert_eq!(study_streak(&records, date(11)), 0);
        assert_eq!(study_streak(&[], date(10)), 0);
    }

    #[test]
    fn focus_score_skips_missing_and_zero() {
        let records = vec![
            record(1, 1, 10, 1, Some(80)),
            record(2, 1, 10, 1, Some(91)),
            record(3, 1, 10, 1, None),
            record(4, 1, 10, 1, Some(0)),
        ];
        assert_eq!(average_focus_score(&records), Some(86));
        assert_eq!(average_focus_score(&records[2..]), None);
    }

    #[test]
    fn distribution_sums_by_subject() {
        let records = vec![
            record(1, 1, 10, 1, None),
            record(2, 2, 25, 2, None),
            record(3, 3, 15, 1, None),
        ];
        let dist = subject_distribution(&records);
        assert_eq!(dist[&SubjectId::new(1)], 25);
        assert_eq!(dist[&SubjectId::new(2)], 25);
    }

    #[test]
    fn week_filters_and_daily_buckets() {
        // 2024-03-10 is a Sunday.
        let week = DateRange::week_of(date(12));
        let records = vec![
            record(1, 9, 40, 1, None),
            record(2, 10, 20, 1, None),
            record(3, 12, 30, 1, None),
            record(4, 12, 15, 2, None),
        ];
        assert_eq!(records_in_range(&records, week).len(), 3);

        let daily = daily_minutes(&records, week);
        assert_eq!(daily.len(), 7);
        assert_eq!(daily[0], (date(10), 20));
        assert_eq!(daily[2], (date(12), 45));
    }

    #[test]
    fn dashboard_labels() {
        let records = vec![record(1, 10, 95, 1, Some(70))];
        let tasks = vec![task(1, 11, true), task(2, 12, false), task(3, 13, false)];
        let stats = DashboardStats::compute(&records, &tasks, date(10));

        assert_eq!(stats.today_study_time(), "1h 35m");
        assert_eq!(stats.tasks.to_string(), "1/3");
        assert_eq!(stats.tasks.percentage, 33);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.focus_score_label(), "70%");
    }

    #[test]
    fn deadlines_are_nearest_open_tasks() {
        let tasks = vec![
            task(1, 20, false),
            task(2, 5, true),
            task(3, 8, false),
            task(4, 12, false),
            task(5, 30, false),
        ];
        let ids: Vec<u64> = upcoming_deadlines(&tasks, 3)
            .iter()
            .map(|t| t.id.value())
            .collect();
        assert_eq!(ids, vec![3, 4, 1]);
    }
}
