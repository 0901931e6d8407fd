//! Router definitions for the planner API.

use axum::Router;
use axum::routing::{get, post, put};
use study_core::model::{StudySession, Subject, Task};

use crate::handlers::{self, RoutedRecord};
use crate::state::AppState;

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/users", post(handlers::create_user))
        .route("/api/users/{id}", get(handlers::get_user))
        .route(
            "/api/study-time-records",
            get(handlers::list_time_records).post(handlers::create_time_record),
        );

    let router = record_routes::<Subject>(router, "/api/subjects");
    let router = record_routes::<Task>(router, "/api/tasks");
    let router = record_routes::<StudySession>(router, "/api/study-sessions");

    router.with_state(state)
}

/// List/create on `base`, update/delete on `base/{id}`.
fn record_routes<R: RoutedRecord>(router: Router<AppState>, base: &str) -> Router<AppState> {
    router
        .route(base, get(handlers::list::<R>).post(handlers::create::<R>))
        .route(
            &format!("{base}/{{id}}"),
            put(handlers::update::<R>).delete(handlers::remove::<R>),
        )
}
