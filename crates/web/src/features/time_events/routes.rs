use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::middleware::auth::bearer_token_validator;

use super::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let auth = HttpAuthentication::bearer(bearer_token_validator);

    cfg.service(
        web::scope("/time-events")
            .route("", web::get().to(handlers::list_time_events))
            .route(
                "",
                web::post().to(handlers::create_time_event).wrap(auth.clone()),
            )
            .route("/{id}", web::get().to(handlers::get_time_event))
            .route(
                "/{id}",
                web::put().to(handlers::update_time_event).wrap(auth.clone()),
            )
            .route(
                "/{id}",
                web::delete().to(handlers::delete_time_event).wrap(auth),
            ),
    );
}
