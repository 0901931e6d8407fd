use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ids::{SubjectId, TaskId, TimeRecordId, UserId};
use crate::model::record::{Record, Validate, ValidationError, deserialize_some};

/// Minutes actually spent studying on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTimeRecord {
    pub id: TimeRecordId,
    pub user_id: UserId,
    pub subject_id: SubjectId,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub date: NaiveDate,
    /// Minutes studied.
    pub duration: u32,
    /// Self-reported focus, 0-100.
    #[serde(default)]
    pub focus_score: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudyTimeRecord {
    pub user_id: UserId,
    pub subject_id: SubjectId,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub date: NaiveDate,
    pub duration: u32,
    #[serde(default)]
    pub focus_score: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTimeRecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub task_id: Option<Option<TaskId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub focus_score: Option<Option<u8>>,
}

fn check_focus_score(score: Option<u8>) -> Result<(), ValidationError> {
    match score {
        Some(s) if s > 100 => Err(ValidationError::FocusScoreOutOfRange(s)),
        _ => Ok(()),
    }
}

impl Validate for NewStudyTimeRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.duration == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        check_focus_score(self.focus_score)
    }
}

impl Validate for StudyTimeRecordPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.duration == Some(0) {
            return Err(ValidationError::ZeroDuration);
        }
        check_focus_score(self.focus_score.flatten())
    }
}

impl Record for StudyTimeRecord {
    type Id = TimeRecordId;
    type Draft = NewStudyTimeRecord;
    type Patch = StudyTimeRecordPatch;

    fn id(&self) -> TimeRecordId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.user_id
    }

    fn from_draft(id: TimeRecordId, draft: NewStudyTimeRecord) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            subject_id: draft.subject_id,
            task_id: draft.task_id,
            date: draft.date,
            duration: draft.duration,
            focus_score: draft.focus_score,
        }
    }

    fn apply_patch(&mut self, patch: StudyTimeRecordPatch) {
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(subject_id) = patch.subject_id {
            self.subject_id = subject_id;
        }
        if let Some(task_id) = patch.task_id {
            self.task_id = task_id;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(focus_score) = patch.focus_score {
            self.focus_score = focus_score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(score: Option<u8>) -> NewStudyTimeRecord {
        NewStudyTimeRecord {
            user_id: UserId::new(1),
            subject_id: SubjectId::new(2),
            task_id: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            duration: 25,
            focus_score: score,
        }
    }

    #[test]
    fn focus_score_is_bounded() {
        assert!(draft(Some(100)).validate().is_ok());
        assert_eq!(
            draft(Some(101)).validate(),
            Err(ValidationError::FocusScoreOutOfRange(101))
        );
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut d = draft(None);
        d.duration = 0;
        assert_eq!(d.validate(), Err(ValidationError::ZeroDuration));
    }
}
