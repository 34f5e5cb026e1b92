use crate::{middlewares::authentication, modules::user::handle::*};
use actix_web::{
    middleware::from_fn,
    web::{scope, ServiceConfig},
};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(sign_up).service(sign_in).service(refresh).service(sign_out);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/users")
            .wrap(from_fn(authentication))
            .service(get_profile)
            .service(search_users),
    );
}
