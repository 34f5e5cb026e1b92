use crate::{middlewares::authentication, modules::friend::handle::*};
use actix_web::{
    middleware::from_fn,
    web::{scope, ServiceConfig},
};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/friend-request")
            .wrap(from_fn(authentication))
            .service(send_friend_request)
            .service(act_on_friend_request)
            .service(list_friends),
    );
}
