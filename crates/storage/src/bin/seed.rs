use std::fmt;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use study_core::model::{
    NewStudySession, NewStudyTimeRecord, NewSubject, NewTask, NewUser, Priority, Subject, User,
};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    days: u32,
    today: Option<NaiveDate>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDays { raw: String },
    InvalidToday { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidToday { raw } => {
                write!(f, "invalid --today value (expected YYYY-MM-DD): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("STUDY_DB_URL").unwrap_or_else(|_| "sqlite://study.sqlite3".into());
        let mut days = std::env::var("STUDY_SEED_DAYS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut today = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--days" => {
                    let value = require_value(&mut args, "--days")?;
                    days = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--today" => {
                    let value = require_value(&mut args, "--today")?;
                    let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|_| ArgsError::InvalidToday { raw: value.clone() })?;
                    today = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            days,
            today,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://study.sqlite3)");
    eprintln!("  --days <n>                Days of study-time history to add (default: 5)");
    eprintln!("  --today <YYYY-MM-DD>      Fixed current date for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  STUDY_DB_URL, STUDY_SEED_DAYS");
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

async fn demo_user(storage: &Storage) -> Result<User, Box<dyn std::error::Error>> {
    let demo = User::demo();
    if let Some(user) = storage.users.find_by_username(&demo.username).await? {
        return Ok(user);
    }
    let user = storage
        .users
        .create_user(NewUser {
            username: demo.username,
            password: demo.password,
            first_name: demo.first_name,
            last_name: demo.last_name,
            email: demo.email,
        })
        .await?;
    Ok(user)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let user = demo_user(&storage).await?;

    let mut subjects = storage.subjects.list_for_user(user.id).await?;
    if subjects.is_empty() {
        for starter in Subject::starter_set(user.id) {
            let subject = storage
                .subjects
                .create(NewSubject {
                    user_id: user.id,
                    name: starter.name,
                    color: starter.color,
                    description: starter.description,
                })
                .await?;
            subjects.push(subject);
        }
    }

    let samples = [
        ("Problem set 4", Priority::High, 1, Some(90)),
        ("Lab report draft", Priority::Medium, 3, Some(120)),
        ("Read chapter 7", Priority::Low, 6, None),
    ];
    for (i, (title, priority, due_in, estimate)) in samples.into_iter().enumerate() {
        let subject = &subjects[i % subjects.len()];
        storage
            .tasks
            .create(NewTask {
                user_id: user.id,
                subject_id: subject.id,
                title: title.into(),
                description: None,
                priority,
                due_date: today + Duration::days(due_in),
                estimated_time: estimate,
                completed: false,
            })
            .await?;
    }

    storage
        .study_sessions
        .create(NewStudySession {
            user_id: user.id,
            subject_id: subjects[0].id,
            title: "Group review".into(),
            description: None,
            location: Some("Library".into()),
            start_time: hm(14, 0),
            end_time: hm(15, 30),
            date: today,
            completed: false,
            participants: Some(4),
        })
        .await?;

    for day in 0..args.days {
        let subject = &subjects[day as usize % subjects.len()];
        storage
            .time_records
            .create(NewStudyTimeRecord {
                user_id: user.id,
                subject_id: subject.id,
                task_id: None,
                date: today - Duration::days(i64::from(day)),
                duration: 25 * (day % 3 + 1),
                focus_score: Some(70 + u8::try_from(day % 4).unwrap_or(0) * 5),
            })
            .await?;
    }

    println!(
        "Seeded user {} with {} subjects, {} tasks and {} days of study time into {}",
        user.username,
        subjects.len(),
        samples.len(),
        args.days,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
