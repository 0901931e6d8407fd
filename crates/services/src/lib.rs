#![forbid(unsafe_code)]

pub mod api_client;
pub mod error;
pub mod notify;
pub mod planner;
pub mod pomodoro;
pub mod resource;
pub mod sync;
pub mod user;
pub mod views;

pub use study_core::Clock;

pub use api_client::{ApiClient, ApiConfig};
pub use error::{ApiClientError, PlannerError, PomodoroError, SyncError};
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use planner::Planner;
pub use pomodoro::PomodoroService;
pub use resource::Resource;
pub use sync::{DataSource, SyncedCollection};
pub use user::UserContext;
pub use views::StudyStats;
