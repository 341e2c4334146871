// ============================================================================
// Tourbook Core - Registration Entity
// File: crates/tourbook-core/src/domain/registration.rs
// Description: User-Activity association and the outcomes reported to callers
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tourbook_shared::constants::{
    MSG_ALREADY_REGISTERED, MSG_NOT_REGISTERED, MSG_REGISTERED, MSG_REGISTRATION_FAILED,
    MSG_WITHDRAWN,
};

/// Row of the `activity_user` join table. At most one per (user, activity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(user_id: Uuid, activity_id: Uuid) -> Self {
        Self {
            user_id,
            activity_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Success,
    Conflict,
    Failure,
}

/// Caller-safe result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub status: RegistrationStatus,
    pub message: String,
}

impl RegistrationOutcome {
    pub fn success() -> Self {
        Self { status: RegistrationStatus::Success, message: MSG_REGISTERED.to_string() }
    }

    pub fn conflict() -> Self {
        Self { status: RegistrationStatus::Conflict, message: MSG_ALREADY_REGISTERED.to_string() }
    }

    pub fn failure() -> Self {
        Self { status: RegistrationStatus::Failure, message: MSG_REGISTRATION_FAILED.to_string() }
    }

    pub fn is_success(&self) -> bool {
        self.status == RegistrationStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawStatus {
    Success,
    NotRegistered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawOutcome {
    pub status: WithdrawStatus,
    pub message: String,
}

impl WithdrawOutcome {
    pub fn success() -> Self {
        Self { status: WithdrawStatus::Success, message: MSG_WITHDRAWN.to_string() }
    }

    pub fn not_registered() -> Self {
        Self { status: WithdrawStatus::NotRegistered, message: MSG_NOT_REGISTERED.to_string() }
    }
}

/// Content of the "registration confirmed" message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationNotice {
    pub activity_name: String,
    pub start_date: DateTime<Utc>,
    pub guide_email: String,
}

/// A registered user as listed to the activity's guide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}
