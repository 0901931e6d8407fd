use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::{RecordId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("invalid email address")]
    InvalidEmail,

    #[error("focus score must be between 0 and 100, got {0}")]
    FocusScoreOutOfRange(u8),

    #[error("duration must be > 0")]
    ZeroDuration,
}

/// Input validation shared by drafts and patches.
pub trait Validate {
    /// Check the value before it is sent to a store.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first offending field.
    fn validate(&self) -> Result<(), ValidationError>;
}

//
// ─── RECORD CONTRACT ───────────────────────────────────────────────────────────
//

/// A user-owned planner record with store-assigned ids.
///
/// `Draft` is the create payload (every field except the id) and `Patch` the
/// partial update payload, where absent fields leave the record untouched.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Id: RecordId;
    type Draft: Clone + fmt::Debug + Serialize + DeserializeOwned + Validate + Send + Sync + 'static;
    type Patch: Clone
        + fmt::Debug
        + Default
        + Serialize
        + DeserializeOwned
        + Validate
        + Send
        + Sync
        + 'static;

    fn id(&self) -> Self::Id;

    /// The user this record belongs to.
    fn owner(&self) -> UserId;

    /// Materialize a stored record from its create payload.
    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;

    /// Merge a partial update into the record.
    fn apply_patch(&mut self, patch: Self::Patch);
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(())
    }
}

pub(crate) fn require_optional_text(
    field: &'static str,
    value: Option<&String>,
) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| require_text(field, v))
}

/// Distinguishes an explicit `null` from an absent field in patch payloads.
///
/// Used with `#[serde(default)]` so absent stays `None` while `null` becomes
/// `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
