mod ids;
mod record;
mod study_session;
mod subject;
mod task;
mod time_record;
mod user;

pub use ids::{ParseIdError, RecordId, StudySessionId, SubjectId, TaskId, TimeRecordId, UserId};
pub use record::{Record, Validate, ValidationError};

pub use study_session::{NewStudySession, StudySession, StudySessionPatch};
pub use subject::{NewSubject, Subject, SubjectPatch};
pub use task::{NewTask, Priority, Task, TaskPatch};
pub use time_record::{NewStudyTimeRecord, StudyTimeRecord, StudyTimeRecordPatch};
pub use user::{NewUser, User};
