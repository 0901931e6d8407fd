use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use study_core::model::UserId;
use study_core::pomodoro::TimerSettingsPatch;

pub const DEFAULT_DB_URL: &str = "sqlite://study.sqlite3";
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_DATA_DIR: &str = ".study-planner";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidAddr { raw: String },
    InvalidMinutes { flag: &'static str, raw: String },
    InvalidUserId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidAddr { raw } => write!(f, "invalid --addr value: {raw}"),
            ArgsError::InvalidMinutes { flag, raw } => {
                write!(f, "invalid {flag} value (expected a positive number): {raw}")
            }
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
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

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  study-planner serve    [--db <sqlite_url|memory>] [--addr <host:port>]");
    eprintln!("  study-planner pomodoro [--data-dir <dir>] [--focus <min>] [--short <min>]");
    eprintln!("                         [--long <min>] [--rounds <n>]");
    eprintln!("  study-planner stats    [--api <url>] [--data-dir <dir>] [--user-id <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --addr {DEFAULT_ADDR}");
    eprintln!("  --data-dir {DEFAULT_DATA_DIR}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_ADDR, STUDY_DATA_DIR, STUDY_API_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Serve(ServeArgs),
    Pomodoro(PomodoroArgs),
    Stats(StatsArgs),
    Help,
}

impl Command {
    /// Parse `argv` without the program name.
    pub fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter();
        match args.next().as_deref() {
            None | Some("--help" | "-h" | "help") => Ok(Self::Help),
            Some("serve") => ServeArgs::parse(&mut args).map(Self::Serve),
            Some("pomodoro") => PomodoroArgs::parse(&mut args).map(Self::Pomodoro),
            Some("stats") => StatsArgs::parse(&mut args).map(Self::Stats),
            Some(other) => Err(ArgsError::UnknownCommand(other.to_owned())),
        }
    }
}

//
// ─── SERVE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    fn from_arg(raw: String) -> Result<Self, ArgsError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ArgsError::InvalidDbUrl { raw });
        }
        if trimmed == "memory" {
            return Ok(Self::Memory);
        }
        Ok(Self::Sqlite(trimmed.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    pub db: Database,
    pub addr: SocketAddr,
}

impl ServeArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db = Database::from_arg(env_or("STUDY_DB_URL", DEFAULT_DB_URL))?;
        let mut addr = parse_addr(env_or("STUDY_ADDR", DEFAULT_ADDR))?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db = Database::from_arg(require_value(args, "--db")?)?,
                "--addr" => addr = parse_addr(require_value(args, "--addr")?)?,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Self { db, addr })
    }
}

fn parse_addr(raw: String) -> Result<SocketAddr, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidAddr { raw })
}

//
// ─── POMODORO ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroArgs {
    pub data_dir: PathBuf,
    pub overrides: TimerSettingsPatch,
}

impl PomodoroArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut data_dir = PathBuf::from(env_or("STUDY_DATA_DIR", DEFAULT_DATA_DIR));
        let mut overrides = TimerSettingsPatch::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => data_dir = PathBuf::from(require_value(args, "--data-dir")?),
                "--focus" => overrides.focus_duration = Some(positive(args, "--focus")?),
                "--short" => overrides.short_break_duration = Some(positive(args, "--short")?),
                "--long" => overrides.long_break_duration = Some(positive(args, "--long")?),
                "--rounds" => {
                    overrides.sessions_before_long_break = Some(positive(args, "--rounds")?);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Self {
            data_dir,
            overrides,
        })
    }
}

fn positive(args: &mut impl Iterator<Item = String>, flag: &'static str) -> Result<u32, ArgsError> {
    let raw = require_value(args, flag)?;
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ArgsError::InvalidMinutes { flag, raw }),
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsArgs {
    /// Base URL of the planner API; local cache only when absent.
    pub api: Option<String>,
    pub data_dir: PathBuf,
    pub user_id: Option<UserId>,
}

impl StatsArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut api = std::env::var("STUDY_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let mut data_dir = PathBuf::from(env_or("STUDY_DATA_DIR", DEFAULT_DATA_DIR));
        let mut user_id = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => api = Some(require_value(args, "--api")?),
                "--data-dir" => data_dir = PathBuf::from(require_value(args, "--data-dir")?),
                "--user-id" => {
                    let raw = require_value(args, "--user-id")?;
                    let parsed = raw
                        .trim()
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: raw.clone() })?;
                    user_id = Some(parsed);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Self {
            api,
            data_dir,
            user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, ArgsError> {
        Command::parse(args.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn serve_accepts_memory_and_address() {
        let cmd = parse(&["serve", "--db", "memory", "--addr", "0.0.0.0:8080"]).unwrap();
        let Command::Serve(args) = cmd else {
            panic!("expected serve");
        };
        assert_eq!(args.db, Database::Memory);
        assert_eq!(args.addr.port(), 8080);
    }

    #[test]
    fn pomodoro_overrides_must_be_positive() {
        let cmd = parse(&["pomodoro", "--focus", "50", "--rounds", "3"]).unwrap();
        let Command::Pomodoro(args) = cmd else {
            panic!("expected pomodoro");
        };
        assert_eq!(args.overrides.focus_duration, Some(50));
        assert_eq!(args.overrides.sessions_before_long_break, Some(3));
        assert_eq!(args.overrides.short_break_duration, None);

        assert!(matches!(
            parse(&["pomodoro", "--short", "0"]),
            Err(ArgsError::InvalidMinutes { flag: "--short", .. })
        ));
    }

    #[test]
    fn errors_name_the_offending_input() {
        assert!(matches!(parse(&["stats", "--user-id", "x"]), Err(ArgsError::InvalidUserId { .. })));
        assert!(matches!(parse(&["serve", "--db"]), Err(ArgsError::MissingValue { flag: "--db" })));
        assert!(matches!(parse(&["launch"]), Err(ArgsError::UnknownCommand(_))));
        assert_eq!(parse(&[]).unwrap(), Command::Help);
    }
}
