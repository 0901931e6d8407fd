use std::fmt::Write as _;
use std::sync::Arc;

use services::{ApiClient, ApiClientError, ApiConfig, Clock, DataSource, LogNotifier, Planner};
use study_core::model::Subject;
use study_core::time::{days_left, format_display_time, format_due_date, format_hours_minutes};

use crate::args::StatsArgs;
use crate::error::AppError;

pub async fn run(args: StatsArgs) -> Result<(), AppError> {
    let api = args
        .api
        .as_deref()
        .map(ApiConfig::new)
        .transpose()
        .map_err(ApiClientError::from)?;
    let client = ApiClient::new(api.clone())?;
    let mut planner = Planner::open(
        args.data_dir.clone(),
        api,
        Arc::new(LogNotifier),
        Clock::default_clock(),
    )?;
    planner.load().await;

    if let Some(user_id) = args.user_id {
        if user_id != planner.user().id {
            let user = client
                .get_user(user_id)
                .await?
                .ok_or(AppError::UnknownUser(user_id))?;
            planner.switch_user(user).await;
        }
    }

    print!("{}", render_report(&planner));
    Ok(())
}

fn subject_name(subjects: &[Subject], id: study_core::model::SubjectId) -> String {
    subjects
        .iter()
        .find(|s| s.id == id)
        .map_or_else(|| format!("Subject {id}"), |s| s.name.clone())
}

/// Plain-text dashboard for the planner's current user.
pub fn render_report(planner: &Planner) -> String {
    let today = planner.today();
    let stats = planner.stats();
    let subjects = planner.subjects().items();
    let mut out = String::new();

    let cached = match planner.time_records().source() {
        DataSource::Remote => "",
        DataSource::LocalCache => "  (local cache)",
    };
    let user = planner.user();
    let _ = writeln!(
        out,
        "{} ({}) on {}{cached}",
        user.full_name(),
        user.username,
        today.format("%Y-%m-%d"),
    );
    let _ = writeln!(out, "  Today:        {}", stats.dashboard.today_study_time());
    let _ = writeln!(
        out,
        "  Tasks:        {} ({}%)",
        stats.dashboard.tasks, stats.dashboard.tasks.percentage
    );
    let _ = writeln!(out, "  Streak:       {} days", stats.dashboard.streak);
    let _ = writeln!(out, "  Focus score:  {}", stats.dashboard.focus_score_label());

    let _ = writeln!(
        out,
        "\nThis week ({} - {}):",
        stats.week.start.format("%b %-d"),
        stats.week.end.format("%b %-d")
    );
    for (day, minutes) in &stats.week_minutes {
        let _ = writeln!(out, "  {}  {}", day.format("%a"), format_hours_minutes(*minutes));
    }

    if !stats.subject_distribution.is_empty() {
        let _ = writeln!(out, "\nBy subject:");
        for (id, minutes) in &stats.subject_distribution {
            let _ = writeln!(
                out,
                "  {:<14} {}",
                subject_name(subjects, *id),
                format_hours_minutes(*minutes)
            );
        }
    }

    let deadlines = planner.tasks().upcoming_deadlines();
    if !deadlines.is_empty() {
        let _ = writeln!(out, "\nUpcoming deadlines:");
        for task in deadlines {
            let _ = writeln!(
                out,
                "  {:<24} {} ({} days left)  [{}]",
                task.title,
                format_due_date(task.due_date, today),
                days_left(task.due_date, today),
                task.priority
            );
        }
    }

    let sessions = planner.today_sessions();
    if !sessions.is_empty() {
        let _ = writeln!(out, "\nToday's sessions:");
        for session in sessions {
            let _ = writeln!(
                out,
                "  {} - {}  {} ({})",
                format_display_time(session.start_time),
                format_display_time(session.end_time),
                session.title,
                session.duration_label()
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use services::MemoryNotifier;
    use storage::local::LocalStore;
    use study_core::model::{
        NewStudySession, NewStudyTimeRecord, NewTask, Priority, SubjectId, UserId,
    };

    #[tokio::test]
    async fn report_lists_headline_numbers_and_schedule() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let clock = Clock::fixed(Utc.from_utc_datetime(&today.and_hms_opt(12, 0, 0).unwrap()));
        let mut planner = Planner::new(
            LocalStore::in_memory(),
            ApiClient::offline(),
            Arc::new(MemoryNotifier::new()),
            clock,
        );
        planner.load().await;

        planner
            .time_records_mut()
            .add(NewStudyTimeRecord {
                user_id: UserId::new(1),
                subject_id: SubjectId::new(1),
                task_id: None,
                date: today,
                duration: 90,
                focus_score: Some(85),
            })
            .await
            .unwrap();
        planner
            .tasks_mut()
            .add(NewTask {
                user_id: UserId::new(1),
                subject_id: SubjectId::new(2),
                title: "Lab report".into(),
                description: None,
                priority: Priority::High,
                due_date: today.succ_opt().unwrap(),
                estimated_time: None,
                completed: false,
            })
            .await
            .unwrap();
        planner
            .sessions_mut()
            .add(NewStudySession {
                user_id: UserId::new(1),
                subject_id: SubjectId::new(3),
                title: "Group review".into(),
                description: None,
                location: None,
                start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
                date: today,
                completed: false,
                participants: None,
            })
            .await
            .unwrap();

        let report = render_report(&planner);
        assert!(report.starts_with("John Student (john_student) on 2024-03-06  (local cache)"));
        assert!(report.contains("Today:        1h 30m"));
        assert!(report.contains("Tasks:        0/1 (0%)"));
        assert!(report.contains("Focus score:  85%"));
        assert!(report.contains("This week (Mar 3 - Mar 9):"));
        assert!(report.contains("Calculus"));
        assert!(report.contains("Tomorrow"));
        assert!(report.contains("2:00 PM - 3:30 PM  Group review (1h 30m)"));
    }
}
