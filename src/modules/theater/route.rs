use crate::modules::theater::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/theaters").service(invite_to_theater));
}
