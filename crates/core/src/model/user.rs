use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;
use crate::model::record::{ValidationError, Validate, require_text};

/// A planner account.
///
/// Credentials are stored as given; authentication is handled elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Create payload for a `User`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    #[must_use]
    pub fn from_new(id: UserId, new: NewUser) -> Self {
        Self {
            id,
            username: new.username,
            password: new.password,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
        }
    }

    /// The demo account used until a real one is stored.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            id: UserId::new(1),
            username: "john_student".into(),
            password: "password123".into(),
            first_name: "John".into(),
            last_name: "Student".into(),
            email: "john@example.com".into(),
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username)?;
        require_text("password", &self.password)?;
        require_text("first name", &self.first_name)?;
        require_text("last name", &self.last_name)?;
        if !self.email.contains('@') || self.email.trim().len() < 3 {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}
