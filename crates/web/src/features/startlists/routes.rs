use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::middleware::auth::bearer_token_validator;

use super::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let auth = HttpAuthentication::bearer(bearer_token_validator);

    cfg.service(
        web::scope("/startlists")
            .route("", web::get().to(handlers::list_startlists))
            .route(
                "",
                web::post().to(handlers::create_startlist).wrap(auth.clone()),
            )
            .route(
                "/generate-startlist-for-event",
                web::post()
                    .to(handlers::generate_startlist_for_event)
                    .wrap(auth.clone()),
            )
            .route("/{id}", web::get().to(handlers::get_startlist))
            .route(
                "/{id}",
                web::put().to(handlers::update_startlist).wrap(auth.clone()),
            )
            .route(
                "/{id}",
                web::delete().to(handlers::delete_startlist).wrap(auth),
            ),
    );
}
