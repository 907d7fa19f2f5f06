use crate::modules::notification::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/notifications")
            .service(create_notification)
            .service(get_notifications)
            .service(read_all_notifications),
    );
}
