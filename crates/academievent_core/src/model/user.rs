//! Users and the acting-user context passed into use-cases.

use crate::model::event::UserId;
use serde::{Deserialize, Serialize};

/// Role assigned at signup; gates organizer and admin screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Student,
    Organizer,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Organizer => "organizer",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Self::Student),
            "organizer" => Some(Self::Organizer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Organizers and admins manage marketplace listings and attendance.
    pub fn can_manage_marketplace(self) -> bool {
        matches!(self, Self::Organizer | Self::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub role: Role,
}

/// Whether the acting user holds a backend session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Signed in; marketplace registrations are recorded remotely.
    Authenticated,
    /// Local profile only; personal schedule writes still succeed.
    LocalOnly,
}

/// User on whose behalf a use-case runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub user: User,
    pub session: SessionState,
}

impl ActingUser {
    pub fn authenticated(user: User) -> Self {
        Self {
            user,
            session: SessionState::Authenticated,
        }
    }

    pub fn local_only(user: User) -> Self {
        Self {
            user,
            session: SessionState::LocalOnly,
        }
    }

    pub fn id(&self) -> &str {
        self.user.id.as_str()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session == SessionState::Authenticated
    }

    /// Notification address, ignoring blank values.
    pub fn email(&self) -> Option<&str> {
        self.user
            .email
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}
