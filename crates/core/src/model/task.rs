use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ids::{SubjectId, TaskId, UserId};
use crate::model::record::{
    Record, Validate, ValidationError, deserialize_some, require_optional_text, require_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("invalid priority: {other}")),
        }
    }
}

/// A to-do item with a due date, filed under a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub subject_id: SubjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: NaiveDate,
    /// Estimated effort in minutes.
    #[serde(default)]
    pub estimated_time: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub user_id: UserId,
    pub subject_id: SubjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub estimated_time: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub estimated_time: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only flips the completion flag.
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}

impl Validate for NewTask {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

impl Validate for TaskPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_optional_text("title", self.title.as_ref())
    }
}

impl Record for Task {
    type Id = TaskId;
    type Draft = NewTask;
    type Patch = TaskPatch;

    fn id(&self) -> TaskId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.user_id
    }

    fn from_draft(id: TaskId, draft: NewTask) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            subject_id: draft.subject_id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            estimated_time: draft.estimated_time,
            completed: draft.completed,
        }
    }

    fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(subject_id) = patch.subject_id {
            self.subject_id = subject_id;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(estimated_time) = patch.estimated_time {
            self.estimated_time = estimated_time;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_shape_with_defaults() {
        let draft: NewTask = serde_json::from_str(
            r#"{"userId":1,"subjectId":2,"title":"Problem set","priority":"high","dueDate":"2024-03-05"}"#,
        )
        .unwrap();
        assert!(!draft.completed);
        assert_eq!(draft.estimated_time, None);
        assert_eq!(draft.priority, Priority::High);

        let task = Task::from_draft(TaskId::new(1), draft);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2024-03-05");
        assert_eq!(json["priority"], "high");
    }

    #[test]
    fn completion_patch_leaves_other_fields() {
        let mut task = Task::from_draft(
            TaskId::new(4),
            NewTask {
                user_id: UserId::new(1),
                subject_id: SubjectId::new(1),
                title: "Read chapter".into(),
                description: None,
                priority: Priority::Low,
                due_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                estimated_time: Some(30),
                completed: false,
            },
        );
        task.apply_patch(TaskPatch::completed(true));
        assert!(task.completed);
        assert_eq!(task.title, "Read chapter");
        assert_eq!(task.estimated_time, Some(30));
    }

    #[test]
    fn priority_parses() {
        assert_eq!("medium".parse::<Priority>(), Ok(Priority::Medium));
        assert!("urgent".parse::<Priority>().is_err());
    }
}
