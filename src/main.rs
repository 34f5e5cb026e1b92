use actix_cors::Cors;
use actix_web::{self, App, HttpServer, http::header, middleware::Logger, web};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database},
    modules::{
        friend::{rate_limit::SlidingWindow, repository_pg::FriendRepositoryPg, service::FriendService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
    },
    utils::SystemClock,
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
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check(db_pool: web::Data<sqlx::PgPool>) -> Result<&'static str, api::error::Error> {
    sqlx::query("SELECT 1")
        .execute(db_pool.get_ref())
        .await
        .map_err(api::error::SystemError::from)?;
    Ok("Server is running")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool = connect_database(&ENV.database_url).await.map_err(|e| {
        log::error!("Database connection error: {e}");
        std::io::Error::other("Database connection error")
    })?;

    let redis_pool = RedisCache::new(&ENV.redis_url).await.map_err(|e| {
        log::error!("Redis connection error: {e}");
        std::io::Error::other("Redis connection error")
    })?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));

    let user_service =
        UserService::with_dependencies(user_repo.clone(), Arc::new(redis_pool), ENV.token_config());
    let friend_service = FriendService::with_dependencies(
        friend_repo,
        user_repo,
        SlidingWindow::new(ENV.friend_request_limit, ENV.friend_request_window_secs),
        Arc::new(SystemClock),
    );

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PATCH", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers(vec![header::RETRY_AFTER])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(ENV.token_config()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .configure(modules::configure)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await
}
