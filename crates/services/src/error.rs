//! Shared error types for the services crate.

use thiserror::Error;

use storage::local::LocalStoreError;
use study_core::model::ValidationError;
use study_core::pomodoro::TimerSettingsError;

/// Errors emitted by `ApiClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiClientError {
    #[error("planner API is not configured")]
    Disabled,
    #[error("planner API request failed with status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl ApiClientError {
    /// True when the server answered 404 for the addressed record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiClientError::HttpStatus { status, .. } if *status == reqwest::StatusCode::NOT_FOUND)
    }
}

/// Errors emitted by synced collections.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{label} {id} not found")]
    NotFound { label: &'static str, id: u64 },
}

/// Errors emitted by `PomodoroService::update_settings`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PomodoroError {
    #[error(transparent)]
    Settings(#[from] TimerSettingsError),
}

/// Errors emitted while bootstrapping the planner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlannerError {
    #[error(transparent)]
    Local(#[from] LocalStoreError),
    #[error(transparent)]
    Api(#[from] ApiClientError),
}
