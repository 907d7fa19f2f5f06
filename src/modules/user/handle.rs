use actix_web::{get, web, HttpRequest};

use crate::api::{error, success};
use crate::modules::user::{model, service::UserService};
use crate::utils::with_deadline;
use crate::{middlewares::get_claims, ENV};

#[get("/profile")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = with_deadline(ENV.deadline(), user_service.get_profile(id)).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}
