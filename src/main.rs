use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};
use tracing_subscriber::EnvFilter;

use crate::{
    configs::{RedisCache, connect_database},
    middlewares::authentication,
    modules::{
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        notification::{repository_pg::NotificationRepositoryPg, service::NotificationService},
        theater::{repository_pg::TheaterRepositoryPg, service::TheaterService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
        websocket::{dispatcher::EventDispatcher, handler::websocket_handler, server::WebSocketServer},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    LazyLock::force(&ENV);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| std::io::Error::other("Tracing subscriber already set"))?;

    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));
    let notification_repo = Arc::new(NotificationRepositoryPg::new(db_pool.clone()));
    let theater_repo = Arc::new(TheaterRepositoryPg::new(db_pool.clone()));

    let ws_server = WebSocketServer::new().start();
    let dispatcher = EventDispatcher::spawn(ENV.push_queue_capacity, ws_server.clone());

    let user_service =
        UserService::with_dependencies(user_repo.clone(), Arc::new(redis_pool), ENV.profile_cache_ttl);
    let notification_service = NotificationService::with_dependencies(
        notification_repo,
        user_repo.clone(),
        friend_repo.clone(),
        theater_repo.clone(),
        dispatcher.clone(),
    );
    let friend_service = FriendService::with_dependencies(
        friend_repo,
        user_repo.clone(),
        notification_service.clone(),
        dispatcher,
    );
    let theater_service =
        TheaterService::with_dependencies(theater_repo, user_repo, notification_service.clone());

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(theater_service.clone()))
            .app_data(web::Data::new(ws_server.clone()))
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api")
                    .wrap(from_fn(authentication))
                    .configure(modules::user::route::configure)
                    .configure(modules::friend::route::configure)
                    .configure(modules::notification::route::configure)
                    .configure(modules::theater::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
