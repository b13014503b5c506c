use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::features::{race_results, start_entries};
use crate::middleware::auth::bearer_token_validator;

use super::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let auth = HttpAuthentication::bearer(bearer_token_validator);

    // The scoped start-entry and race-result resources must come before the
    // plain race routes so that "/races/{id}/..." paths reach them.
    cfg.service(
        web::scope("/races")
            .service(start_entries::routes::scoped())
            .service(race_results::routes::scoped())
            .route("", web::get().to(handlers::list_races))
            .route("", web::post().to(handlers::create_race).wrap(auth.clone()))
            .route("/{id}", web::get().to(handlers::get_race))
            .route(
                "/{id}",
                web::put().to(handlers::update_race).wrap(auth.clone()),
            )
            .route("/{id}", web::delete().to(handlers::delete_race).wrap(auth)),
    );
}
