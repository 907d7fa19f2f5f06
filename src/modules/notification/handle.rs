use actix_web::{get, post, web, HttpRequest};

use crate::api::{error, success};
use crate::modules::notification::{
    model::{CreateNotificationBody, CreatedNotification, NotificationList, NotificationQuery},
    service::NotificationService,
};
use crate::utils::{with_deadline, ValidatedJson, ValidatedQuery};
use crate::{middlewares::get_claims, ENV};

#[post("")]
pub async fn create_notification(
    notification_service: web::Data<NotificationService>,
    ValidatedJson(body): ValidatedJson<CreateNotificationBody>,
    req: HttpRequest,
) -> Result<success::Success<CreatedNotification>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let created = with_deadline(
        ENV.deadline(),
        notification_service.create_notification(caller_id, body),
    )
    .await?;

    Ok(success::Success::created(Some(created)).message("Notification created successfully"))
}

#[get("")]
pub async fn get_notifications(
    notification_service: web::Data<NotificationService>,
    ValidatedQuery(query): ValidatedQuery<NotificationQuery>,
    req: HttpRequest,
) -> Result<success::Success<NotificationList>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    let list =
        with_deadline(ENV.deadline(), notification_service.get_notifications(caller_id, query))
            .await?;

    Ok(success::Success::ok(Some(list)).message("Notifications retrieved successfully"))
}

#[post("/read")]
pub async fn read_all_notifications(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let caller_id = get_claims(&req)?.sub;
    with_deadline(ENV.deadline(), notification_service.read_all(caller_id)).await?;

    Ok(success::Success::ok(None).message("Notifications marked as read"))
}
