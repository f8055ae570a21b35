//! Marketplace registration model.
//!
//! # Invariants
//! - At most one registration exists per `(event_id, user_id)` pair; storage
//!   enforces this, not callers.

use crate::model::event::{EventId, UserId};
use serde::{Deserialize, Serialize};

/// Attendance lifecycle for one registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    Attended,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Attended => "attended",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "registered" => Some(Self::Registered),
            "attended" => Some(Self::Attended),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Link between a user and a marketplace event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: RegistrationStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
