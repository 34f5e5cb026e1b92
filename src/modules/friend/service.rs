use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::{
    api::{
        error,
        pagination::{PageQuery, Paginated},
    },
    modules::{
        friend::{
            model::{FriendListStatus, FriendListing, NewFriendRequest},
            rate_limit::SlidingWindow,
            repository::{FriendRepo, PENDING_PAIR_CONSTRAINT},
            schema::{FriendDecision, FriendRequestEntity},
        },
        user::repository::UserRepository,
    },
    utils::Clock,
};

const DUPLICATE_PENDING: &str = "A pending friend request already exists between these users";

#[derive(Clone)]
pub struct FriendService {
    friend_repo: Arc<dyn FriendRepo>,
    user_repo: Arc<dyn UserRepository>,
    limiter: SlidingWindow,
    clock: Arc<dyn Clock>,
}

impl FriendService {
    pub fn with_dependencies(
        friend_repo: Arc<dyn FriendRepo>,
        user_repo: Arc<dyn UserRepository>,
        limiter: SlidingWindow,
        clock: Arc<dyn Clock>,
    ) -> Self {
        FriendService { friend_repo, user_repo, limiter, clock }
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        if receiver_id == sender_id {
            return Err(error::SystemError::bad_request(
                "Cannot send a friend request to yourself",
            ));
        }

        match self.user_repo.find_by_id(&receiver_id).await? {
            Some(user) if user.is_active => {}
            _ => return Err(error::SystemError::not_found("Receiver not found")),
        }

        let now = self.clock.now();

        let (pending, friends, sent) = tokio::try_join!(
            self.friend_repo.find_pending_between(&sender_id, &receiver_id),
            self.friend_repo.are_friends(&sender_id, &receiver_id),
            self.friend_repo.sent_since(&sender_id, self.limiter.window_start(now)),
        )?;

        if pending.is_some() {
            return Err(error::SystemError::conflict(DUPLICATE_PENDING));
        }

        if friends {
            return Err(error::SystemError::conflict("You are already friends with this user"));
        }

        if let Err(e) = self.limiter.check(now, &sent) {
            warn!("User {} hit the friend request limit ({} in window)", sender_id, sent.count);
            return Err(e);
        }

        let new_request = NewFriendRequest {
            id: Uuid::now_v7(),
            from_user_id: sender_id,
            to_user_id: receiver_id,
            created_at: now,
        };

        let request = self.friend_repo.create_friend_request(&new_request).await.map_err(|e| {
            if e.is_unique_violation_on(PENDING_PAIR_CONSTRAINT) {
                error::SystemError::conflict(DUPLICATE_PENDING)
            } else {
                e
            }
        })?;

        info!("Friend request {} sent from {} to {}", request.id, sender_id, receiver_id);
        Ok(request)
    }

    pub async fn act_on_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        decision: FriendDecision,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = self
            .friend_repo
            .find_friend_request_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.to_user_id != user_id {
            return Err(error::SystemError::forbidden(
                "You do not have permission to perform this action",
            ));
        }

        let status = request.status.resolve(decision)?;

        let updated = self
            .friend_repo
            .resolve_pending(&request_id, status, self.clock.now())
            .await?
            .ok_or_else(|| error::SystemError::conflict("Friend request already resolved"))?;

        info!("Friend request {} {:?} by {}", request_id, updated.status, user_id);
        Ok(updated)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        status: FriendListStatus,
        page: &PageQuery,
    ) -> Result<FriendListing, error::SystemError> {
        match status {
            FriendListStatus::Accepted => {
                let (friends, total) = tokio::try_join!(
                    self.friend_repo.find_friends(&user_id, page.limit(), page.offset()),
                    self.friend_repo.count_friends(&user_id),
                )?;
                Ok(FriendListing::Friends(Paginated::new(friends, total, page)))
            }
            FriendListStatus::Pending => {
                let (requests, total) = tokio::try_join!(
                    self.friend_repo.find_received_pending(&user_id, page.limit(), page.offset()),
                    self.friend_repo.count_received_pending(&user_id),
                )?;
                Ok(FriendListing::Requests(Paginated::new(requests, total, page)))
            }
        }
    }
}
