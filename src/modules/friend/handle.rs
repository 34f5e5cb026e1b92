use actix_web::{get, patch, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, pagination::PageQuery, success},
    middlewares::get_claims,
    modules::friend::{
        model::{FriendActionBody, FriendListQuery, FriendListing, SendFriendRequestBody},
        schema::{FriendDecision, FriendRequestEntity},
        service::FriendService,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[post("/send/")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    body: ValidatedJson<SendFriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    let request = friend_service.send_friend_request(sender_id, body.0.receiver_id).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[patch("/action/{request_id}/")]
pub async fn act_on_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    body: ValidatedJson<FriendActionBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let receiver_id = get_claims(&req)?.sub;
    let decision = body.0.decision;
    let request =
        friend_service.act_on_friend_request(receiver_id, request_id.into_inner(), decision).await?;

    let message = match decision {
        FriendDecision::Accept => "Friend request accepted successfully",
        FriendDecision::Reject => "Friend request rejected successfully",
    };
    Ok(success::Success::ok(Some(request)).message(message))
}

#[get("/list/")]
pub async fn list_friends(
    friend_service: web::Data<FriendService>,
    query: ValidatedQuery<FriendListQuery>,
    page: ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<FriendListing>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let status = query.0.status.unwrap_or_default();
    let listing = friend_service.list(user_id, status, &page.0).await?;

    Ok(success::Success::ok(Some(listing)).message("Friend list retrieved successfully"))
}
