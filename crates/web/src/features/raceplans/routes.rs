use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::middleware::auth::bearer_token_validator;

use super::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    let auth = HttpAuthentication::bearer(bearer_token_validator);

    cfg.service(
        web::scope("/raceplans")
            .route("", web::get().to(handlers::list_raceplans))
            .route(
                "",
                web::post().to(handlers::create_raceplan).wrap(auth.clone()),
            )
            .route(
                "/generate-raceplan-for-event",
                web::post()
                    .to(handlers::generate_raceplan_for_event)
                    .wrap(auth.clone()),
            )
            .route("/{id}", web::get().to(handlers::get_raceplan))
            .route(
                "/{id}",
                web::put().to(handlers::update_raceplan).wrap(auth.clone()),
            )
            .route(
                "/{id}",
                web::delete().to(handlers::delete_raceplan).wrap(auth.clone()),
            )
            .route(
                "/{id}/validate",
                web::post().to(handlers::validate_raceplan).wrap(auth),
            ),
    );
}
