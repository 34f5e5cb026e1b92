use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::{FriendResponse, NewFriendRequest, ReceivedFriendRequest},
        rate_limit::SentWindow,
        schema::{FriendRequestEntity, FriendRequestStatus},
    },
};

/// Name of the partial unique index guarding one pending request per pair.
pub const PENDING_PAIR_CONSTRAINT: &str = "friend_requests_pending_pair";

/// Friendships are accepted requests, read from either side.
#[async_trait::async_trait]
pub trait FriendRepository {
    async fn are_friends(&self, user_id_a: &Uuid, user_id_b: &Uuid)
    -> Result<bool, error::SystemError>;

    async fn find_friends(
        &self,
        user_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FriendResponse>, error::SystemError>;

    async fn count_friends(&self, user_id: &Uuid) -> Result<i64, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Pending request between the pair, in either direction.
    async fn find_pending_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_received_pending(
        &self,
        user_id: &Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReceivedFriendRequest>, error::SystemError>;

    async fn count_received_pending(&self, user_id: &Uuid) -> Result<i64, error::SystemError>;

    /// Requests created by `sender_id` at or after `since`.
    async fn sent_since(
        &self,
        sender_id: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<SentWindow, error::SystemError>;

    /// Fails with a unique violation on [`PENDING_PAIR_CONSTRAINT`] if the pair already has one.
    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    /// Moves a pending request to `status`. Returns `None` if it was no longer pending.
    async fn resolve_pending(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;
}

pub trait FriendRepo: FriendRepository + FriendRequestRepository + Send + Sync {}

impl<T> FriendRepo for T where T: FriendRepository + FriendRequestRepository + Send + Sync {}
