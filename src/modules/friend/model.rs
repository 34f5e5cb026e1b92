use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::pagination::Paginated,
    modules::{
        friend::schema::{FriendDecision, FriendRequestStatus},
        user::model::UserResponse,
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendFriendRequestBody {
    pub receiver_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FriendActionBody {
    #[serde(alias = "status")]
    pub decision: FriendDecision,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendListStatus {
    #[default]
    Accepted,
    Pending,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FriendListQuery {
    pub status: Option<FriendListStatus>,
}

/// The other side of an accepted request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub friends_since: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(sqlx::FromRow)]
pub struct ReceivedRequestRow {
    pub req_id: Uuid,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedFriendRequest {
    pub id: Uuid,
    pub from_user: UserResponse,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReceivedRequestRow> for ReceivedFriendRequest {
    fn from(r: ReceivedRequestRow) -> Self {
        ReceivedFriendRequest {
            id: r.req_id,
            from_user: UserResponse {
                id: r.user_id,
                email: r.email,
                first_name: r.first_name,
                last_name: r.last_name,
            },
            status: r.status,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FriendListing {
    Friends(Paginated<FriendResponse>),
    Requests(Paginated<ReceivedFriendRequest>),
}

pub struct NewFriendRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
