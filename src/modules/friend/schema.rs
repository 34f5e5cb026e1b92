use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

use crate::api::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendDecision {
    #[serde(alias = "accepted")]
    Accept,
    #[serde(alias = "rejected")]
    Reject,
}

impl FriendRequestStatus {
    /// Pending is the only state a decision can move; accepted and rejected are terminal.
    pub fn resolve(self, decision: FriendDecision) -> Result<Self, error::SystemError> {
        match self {
            FriendRequestStatus::Pending => Ok(match decision {
                FriendDecision::Accept => FriendRequestStatus::Accepted,
                FriendDecision::Reject => FriendRequestStatus::Rejected,
            }),
            FriendRequestStatus::Accepted => {
                Err(error::SystemError::conflict("Friend request already accepted"))
            }
            FriendRequestStatus::Rejected => {
                Err(error::SystemError::conflict("Friend request already rejected"))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub responded_at: Option<chrono::DateTime<chrono::Utc>>,
}
