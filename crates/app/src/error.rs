use services::{ApiClientError, PlannerError, PomodoroError};
use storage::local::LocalStoreError;
use storage::sqlite::SqliteInitError;
use study_core::model::UserId;
use thiserror::Error;

use crate::args::ArgsError;

/// Anything that stops a subcommand; printed once by `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Local(#[from] LocalStoreError),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Pomodoro(#[from] PomodoroError),
    #[error(transparent)]
    Api(#[from] ApiClientError),
    #[error("user {0} not found")]
    UnknownUser(UserId),
}
