use serde::{Deserialize, Serialize};

use crate::model::ids::{SubjectId, UserId};
use crate::model::record::{
    Record, Validate, ValidationError, deserialize_some, require_optional_text, require_text,
};

/// A course or topic that tasks, sessions and study time are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub description: Option<Option<String>>,
}

impl Subject {
    /// Placeholder shown when a task points at a missing subject.
    #[must_use]
    pub fn unknown(user_id: UserId) -> Self {
        Self {
            id: SubjectId::new(0),
            user_id,
            name: "Unknown".into(),
            color: "gray".into(),
            description: Some(String::new()),
        }
    }

    /// Starter subjects used when nothing has been stored yet.
    #[must_use]
    pub fn starter_set(user_id: UserId) -> Vec<Self> {
        [
            (1, "Calculus", "blue", "Calculus and advanced mathematics"),
            (2, "Physics", "purple", "Physics and mechanics"),
            (3, "Biology", "green", "Biology and life sciences"),
        ]
        .into_iter()
        .map(|(id, name, color, description)| Self {
            id: SubjectId::new(id),
            user_id,
            name: name.into(),
            color: color.into(),
            description: Some(description.into()),
        })
        .collect()
    }
}

impl Validate for NewSubject {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("color", &self.color)
    }
}

impl Validate for SubjectPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_optional_text("name", self.name.as_ref())?;
        require_optional_text("color", self.color.as_ref())
    }
}

impl Record for Subject {
    type Id = SubjectId;
    type Draft = NewSubject;
    type Patch = SubjectPatch;

    fn id(&self) -> SubjectId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.user_id
    }

    fn from_draft(id: SubjectId, draft: NewSubject) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            name: draft.name,
            color: draft.color,
            description: draft.description,
        }
    }

    fn apply_patch(&mut self, patch: SubjectPatch) {
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}
