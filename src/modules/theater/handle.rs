use actix_web::{post, web, HttpRequest};

use crate::api::{error, success};
use crate::modules::theater::{
    model::{InviteBody, InviteResponse},
    service::TheaterService,
};
use crate::utils::{with_deadline, ValidatedJson};
use crate::{middlewares::get_claims, ENV};

#[post("/{theater_id}/invite")]
pub async fn invite_to_theater(
    theater_service: web::Data<TheaterService>,
    theater_id: web::Path<String>,
    ValidatedJson(body): ValidatedJson<InviteBody>,
    req: HttpRequest,
) -> Result<success::Success<InviteResponse>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let invited = with_deadline(
        ENV.deadline(),
        theater_service.invite(caller_id, &theater_id, &body.friend_ids),
    )
    .await?;

    Ok(success::Success::ok(Some(InviteResponse { invited })).message("Invites sent successfully"))
}
