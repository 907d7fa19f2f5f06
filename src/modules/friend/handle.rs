use actix_web::{get, post, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{
            model::{PendingFriendRequest, SendFriendRequestBody},
            schema::FriendRequestEntity,
            service::FriendService,
        },
        user::model::PublicUser,
    },
    utils::{with_deadline, ValidatedJson},
    ENV,
};

#[post("/requests")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    ValidatedJson(body): ValidatedJson<SendFriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let request = with_deadline(
        ENV.deadline(),
        friend_service.send_friend_request(caller_id, &body.friend_id),
    )
    .await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[post("/requests/{request_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let request = with_deadline(
        ENV.deadline(),
        friend_service.accept_friend_request(caller_id, &request_id),
    )
    .await?;

    Ok(success::Success::ok(Some(request)).message("Friend request accepted successfully"))
}

#[get("/requests/{request_id}")]
pub async fn get_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let request =
        with_deadline(ENV.deadline(), friend_service.get_friend_request(caller_id, &request_id))
            .await?;

    Ok(success::Success::ok(Some(request)).message("Friend request retrieved successfully"))
}

#[get("/requests")]
pub async fn list_friend_requests(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<PendingFriendRequest>>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let requests =
        with_deadline(ENV.deadline(), friend_service.get_pending_friend_requests(caller_id))
            .await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/by-username/{username}")]
pub async fn get_friend(
    friend_service: web::Data<FriendService>,
    username: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<PublicUser>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let friend = with_deadline(ENV.deadline(), friend_service.get_friend(caller_id, &username))
        .await?;

    Ok(success::Success::ok(Some(friend)).message("Friend retrieved successfully"))
}
