use storage::local::StorageKey;
use study_core::model::{Record, StudySession, StudyTimeRecord, Subject, Task, UserId};

/// A record type that has a REST route and a local cache slot.
pub trait Resource: Record {
    /// Collection route, e.g. `/api/tasks`.
    const PATH: &'static str;
    const KEY: StorageKey;
    /// Used in "Failed to load {LOAD_LABEL} data".
    const LOAD_LABEL: &'static str;
    /// Used in "Failed to add new {NOUN}" and similar.
    const NOUN: &'static str;

    /// Local value used before anything was cached.
    fn initial() -> Vec<Self> {
        Vec::new()
    }
}

impl Resource for Subject {
    const PATH: &'static str = "/api/subjects";
    const KEY: StorageKey = StorageKey::Subjects;
    const LOAD_LABEL: &'static str = "subject";
    const NOUN: &'static str = "subject";

    fn initial() -> Vec<Self> {
        Subject::starter_set(UserId::new(1))
    }
}

impl Resource for Task {
    const PATH: &'static str = "/api/tasks";
    const KEY: StorageKey = StorageKey::Tasks;
    const LOAD_LABEL: &'static str = "tasks";
    const NOUN: &'static str = "task";
}

impl Resource for StudySession {
    const PATH: &'static str = "/api/study-sessions";
    const KEY: StorageKey = StorageKey::StudySessions;
    const LOAD_LABEL: &'static str = "study session";
    const NOUN: &'static str = "study session";
}

impl Resource for StudyTimeRecord {
    const PATH: &'static str = "/api/study-time-records";
    const KEY: StorageKey = StorageKey::StudyTimeRecords;
    const LOAD_LABEL: &'static str = "study time";
    const NOUN: &'static str = "study time record";
}
