use actix_web::web;

pub mod friend;
pub mod user;

/// Public auth routes at the root; `/users` and `/friend-request` require a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(user::route::public_api_configure)
        .configure(user::route::configure)
        .configure(friend::route::configure);
}
